use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

use super::decision::DecisionBasis;
use crate::util::dates::iso_date;

/// Trade direction of a shipment; selects which ocean rate history applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneDirection {
    /// Shanghai -> Los Angeles
    Inbound,
    /// Los Angeles -> Shanghai
    Outbound,
}

impl LaneDirection {
    pub const ALL: [LaneDirection; 2] = [LaneDirection::Inbound, LaneDirection::Outbound];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    pub fn lane_name(&self) -> &'static str {
        match self {
            Self::Inbound => "Shanghai -> Los Angeles",
            Self::Outbound => "Los Angeles -> Shanghai",
        }
    }
}

impl fmt::Display for LaneDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FreightMode {
    Air,
    Ocean,
}

impl FreightMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Air => "AIR",
            Self::Ocean => "OCEAN",
        }
    }
}

impl fmt::Display for FreightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn default_incoterm() -> String {
    "FOB".to_string()
}

/// One row of the batch input. Dimensions are per piece.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub shipment_id: String,
    #[serde(with = "iso_date")]
    pub ship_date: Date,
    /// Informational only; never used in costing.
    #[serde(default = "default_incoterm")]
    pub incoterm: String,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    pub pieces: u32,
    pub actual_weight_kg: f64,
    pub max_transit_days: u32,
    /// Share of a 40ft container the shipment consumes. Clamped to [0, 1] at use.
    pub container_utilization: f64,
    pub direction: LaneDirection,
}

/// A single observed ocean rate (USD per 40ft container).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub rate_usd_40ft: f64,
}

impl RatePoint {
    pub fn new(date: Date, rate_usd_40ft: f64) -> Self {
        Self {
            date,
            rate_usd_40ft,
        }
    }
}

/// Run-wide costing parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Air rate card, USD per chargeable kg.
    pub air_usd_per_chg_kg: f64,
    pub air_min_charge_usd: f64,
    pub air_transit_days: u32,
    /// Door-to-door ocean transit assumption.
    pub ocean_transit_days: u32,
    /// cm^3 per kg; 6000 is the common metric air divisor.
    pub volumetric_divisor: f64,
    /// Height multiplier for the packaging scenario.
    pub packaging_height_factor: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            air_usd_per_chg_kg: 6.50,
            air_min_charge_usd: 120.0,
            air_transit_days: 3,
            ocean_transit_days: 25,
            volumetric_divisor: super::weight::DEFAULT_VOLUMETRIC_DIVISOR,
            packaging_height_factor: super::sensitivity::PACKAGING_HEIGHT_FACTOR,
        }
    }
}

/// Everything derived for one shipment in one pipeline run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShipmentResult {
    pub shipment: Shipment,
    pub vol_weight_kg: f64,
    pub chg_weight_kg: f64,
    /// `None` when the actual weight is zero.
    pub vol_to_actual_ratio: Option<f64>,
    pub vol_weight_kg_pack10: f64,
    pub chg_weight_kg_pack10: f64,
    pub chg_weight_delta_kg_pack10: f64,
    pub ocean_rate_usd_40ft: f64,
    pub air_cost_usd: f64,
    pub ocean_cost_usd: f64,
    pub air_transit_days: u32,
    pub ocean_transit_days: u32,
    pub air_meets_sla: bool,
    pub ocean_meets_sla: bool,
    pub recommended_mode: FreightMode,
    pub decision_basis: DecisionBasis,
    pub cost_delta_air_minus_ocean_usd: f64,
    pub cheaper_mode: FreightMode,
}

impl ShipmentResult {
    pub fn sla_violated(&self) -> bool {
        !self.air_meets_sla && !self.ocean_meets_sla
    }
}
