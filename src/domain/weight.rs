//! Volumetric and chargeable weight.

use super::entities::Shipment;

/// Common metric divisor (cm^3 per kg) for air volumetric weight.
pub const DEFAULT_VOLUMETRIC_DIVISOR: f64 = 6000.0;

/// `(L * W * H / divisor) * pieces`, with dimensions per piece in cm.
pub fn volumetric_weight_kg(
    length_cm: f64,
    width_cm: f64,
    height_cm: f64,
    pieces: u32,
    divisor: f64,
) -> f64 {
    (length_cm * width_cm * height_cm / divisor) * pieces as f64
}

/// Carriers bill against the greater of actual and volumetric weight.
pub fn chargeable_weight_kg(actual_weight_kg: f64, volumetric_weight_kg: f64) -> f64 {
    actual_weight_kg.max(volumetric_weight_kg)
}

/// Baseline weights for a shipment, unrounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightProfile {
    pub volumetric_kg: f64,
    pub chargeable_kg: f64,
}

pub fn weigh(shipment: &Shipment, divisor: f64) -> WeightProfile {
    let volumetric_kg = volumetric_weight_kg(
        shipment.length_cm,
        shipment.width_cm,
        shipment.height_cm,
        shipment.pieces,
        divisor,
    );
    WeightProfile {
        volumetric_kg,
        chargeable_kg: chargeable_weight_kg(shipment.actual_weight_kg, volumetric_kg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn volumetric_weight_matches_formula() {
        // 50 x 40 x 30 cm = 60,000 cm^3 -> 10 kg per piece.
        assert_eq!(volumetric_weight_kg(50.0, 40.0, 30.0, 1, 6000.0), 10.0);
        assert_eq!(volumetric_weight_kg(50.0, 40.0, 30.0, 3, 6000.0), 30.0);
        assert_eq!(volumetric_weight_kg(50.0, 40.0, 30.0, 1, 5000.0), 12.0);
    }

    #[test]
    fn chargeable_weight_takes_heavier_basis() {
        assert_eq!(chargeable_weight_kg(20.0, 10.0), 20.0);
        assert_eq!(chargeable_weight_kg(5.0, 10.0), 10.0);
        assert_eq!(chargeable_weight_kg(0.0, 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn chargeable_is_max_of_inputs(a in 0.0f64..1e6, v in 0.0f64..1e6) {
            let chg = chargeable_weight_kg(a, v);
            prop_assert_eq!(chg, a.max(v));
            prop_assert!(chg >= a);
            prop_assert!(chg >= v);
        }

        #[test]
        fn volumetric_scales_linearly_in_pieces(
            l in 0.0f64..300.0,
            w in 0.0f64..300.0,
            h in 0.0f64..300.0,
            p in 1u32..50,
        ) {
            let single = volumetric_weight_kg(l, w, h, 1, 6000.0);
            let many = volumetric_weight_kg(l, w, h, p, 6000.0);
            prop_assert!(close(many, single * p as f64));
        }

        #[test]
        fn halving_divisor_doubles_volumetric(
            l in 0.0f64..300.0,
            w in 0.0f64..300.0,
            h in 0.0f64..300.0,
            p in 1u32..20,
            d in 100.0f64..10_000.0,
        ) {
            let base = volumetric_weight_kg(l, w, h, p, d);
            let halved = volumetric_weight_kg(l, w, h, p, d / 2.0);
            prop_assert!(close(halved, base * 2.0));
        }
    }
}
