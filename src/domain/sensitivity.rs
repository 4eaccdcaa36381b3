//! Packaging what-if analytics. Informational only; never feeds costing.

use super::{
    entities::Shipment,
    weight::{chargeable_weight_kg, volumetric_weight_kg, WeightProfile},
};

/// Height multiplier for the "trim packaging height by 10%" scenario.
pub const PACKAGING_HEIGHT_FACTOR: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackagingScenario {
    pub volumetric_kg: f64,
    pub chargeable_kg: f64,
    /// Scenario chargeable weight minus baseline chargeable weight.
    pub chargeable_delta_kg: f64,
}

/// Re-weighs the shipment with its height scaled by `height_factor`.
pub fn packaging_scenario(
    shipment: &Shipment,
    baseline: &WeightProfile,
    divisor: f64,
    height_factor: f64,
) -> PackagingScenario {
    let volumetric_kg = volumetric_weight_kg(
        shipment.length_cm,
        shipment.width_cm,
        shipment.height_cm * height_factor,
        shipment.pieces,
        divisor,
    );
    let chargeable_kg = chargeable_weight_kg(shipment.actual_weight_kg, volumetric_kg);
    PackagingScenario {
        volumetric_kg,
        chargeable_kg,
        chargeable_delta_kg: chargeable_kg - baseline.chargeable_kg,
    }
}

/// Above 1 the shipment is bulky (volume-priced), below 1 it is dense.
/// Undefined when the actual weight is zero.
pub fn vol_to_actual_ratio(volumetric_kg: f64, actual_weight_kg: f64) -> Option<f64> {
    if actual_weight_kg == 0.0 {
        None
    } else {
        Some(volumetric_kg / actual_weight_kg)
    }
}
