//! Air and ocean cost models.

/// Floor-priced air rate card: never below `min_charge_usd`.
pub fn air_cost_usd(chargeable_weight_kg: f64, usd_per_chg_kg: f64, min_charge_usd: f64) -> f64 {
    min_charge_usd.max(chargeable_weight_kg * usd_per_chg_kg)
}

/// Allocates a full 40ft container rate by the share of the container used.
/// Utilization outside [0, 1] is clamped.
pub fn ocean_cost_usd(rate_usd_40ft: f64, utilization: f64) -> f64 {
    rate_usd_40ft * utilization.clamp(0.0, 1.0)
}
