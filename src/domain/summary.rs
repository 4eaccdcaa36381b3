use std::collections::BTreeMap;

use serde::Serialize;

use super::entities::{FreightMode, ShipmentResult};

/// Aggregate over all results sharing one recommended mode.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModeSummary {
    pub mode: FreightMode,
    pub shipments: usize,
    pub avg_air_cost_usd: f64,
    pub avg_ocean_cost_usd: f64,
    /// Fraction in [0, 1].
    pub air_sla_rate: f64,
    /// Fraction in [0, 1].
    pub ocean_sla_rate: f64,
    /// Rows where neither mode meets the SLA.
    pub sla_violations: usize,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    air_cost: f64,
    ocean_cost: f64,
    air_ok: usize,
    ocean_ok: usize,
    violations: usize,
}

/// One row per recommended mode that occurs, AIR before OCEAN.
pub fn summarize_by_mode(results: &[ShipmentResult]) -> Vec<ModeSummary> {
    let mut groups: BTreeMap<FreightMode, Accumulator> = BTreeMap::new();

    for result in results {
        let acc = groups.entry(result.recommended_mode).or_default();
        acc.count += 1;
        acc.air_cost += result.air_cost_usd;
        acc.ocean_cost += result.ocean_cost_usd;
        acc.air_ok += usize::from(result.air_meets_sla);
        acc.ocean_ok += usize::from(result.ocean_meets_sla);
        acc.violations += usize::from(result.sla_violated());
    }

    groups
        .into_iter()
        .map(|(mode, acc)| {
            let n = acc.count as f64;
            ModeSummary {
                mode,
                shipments: acc.count,
                avg_air_cost_usd: acc.air_cost / n,
                avg_ocean_cost_usd: acc.ocean_cost / n,
                air_sla_rate: acc.air_ok as f64 / n,
                ocean_sla_rate: acc.ocean_ok as f64 / n,
                sla_violations: acc.violations,
            }
        })
        .collect()
}
