//! SLA-and-cost mode decision table.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entities::FreightMode;

/// Which row of the decision table produced a recommendation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBasis {
    OnlyAirMeetsSla,
    OnlyOceanMeetsSla,
    /// Both modes meet the SLA; the cheaper one wins.
    Cheaper,
    /// Neither mode meets the SLA; the faster one wins.
    FasterSlaMissed,
}

impl DecisionBasis {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OnlyAirMeetsSla => "only_air_meets_sla",
            Self::OnlyOceanMeetsSla => "only_ocean_meets_sla",
            Self::Cheaper => "cheaper",
            Self::FasterSlaMissed => "faster_sla_missed",
        }
    }
}

impl fmt::Display for DecisionBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeDecision {
    pub mode: FreightMode,
    pub basis: DecisionBasis,
    pub air_meets_sla: bool,
    pub ocean_meets_sla: bool,
}

impl ModeDecision {
    pub fn rationale(&self, air_cost_usd: f64, ocean_cost_usd: f64) -> String {
        match self.basis {
            DecisionBasis::OnlyAirMeetsSla => "Only air meets the transit limit".to_string(),
            DecisionBasis::OnlyOceanMeetsSla => "Only ocean meets the transit limit".to_string(),
            DecisionBasis::Cheaper => format!(
                "Both modes meet the transit limit; air {:.2} vs ocean {:.2}",
                air_cost_usd, ocean_cost_usd
            ),
            DecisionBasis::FasterSlaMissed => {
                format!("No mode meets the transit limit; {} is faster", self.mode)
            }
        }
    }
}

/// Applies the decision table:
///
/// 1. only air meets `max_days` -> AIR
/// 2. only ocean meets `max_days` -> OCEAN
/// 3. both meet -> AIR if strictly cheaper, else OCEAN
/// 4. neither meets -> AIR if strictly faster, else OCEAN
///
/// Ties in rows 3 and 4 resolve to OCEAN.
pub fn recommend_mode(
    air_cost_usd: f64,
    ocean_cost_usd: f64,
    air_days: u32,
    ocean_days: u32,
    max_days: u32,
) -> ModeDecision {
    let air_ok = air_days <= max_days;
    let ocean_ok = ocean_days <= max_days;

    let (mode, basis) = match (air_ok, ocean_ok) {
        (true, false) => (FreightMode::Air, DecisionBasis::OnlyAirMeetsSla),
        (false, true) => (FreightMode::Ocean, DecisionBasis::OnlyOceanMeetsSla),
        (true, true) => (
            cheaper_mode(air_cost_usd, ocean_cost_usd),
            DecisionBasis::Cheaper,
        ),
        (false, false) => {
            let faster = if air_days < ocean_days {
                FreightMode::Air
            } else {
                FreightMode::Ocean
            };
            (faster, DecisionBasis::FasterSlaMissed)
        }
    };

    ModeDecision {
        mode,
        basis,
        air_meets_sla: air_ok,
        ocean_meets_sla: ocean_ok,
    }
}

/// AIR only when strictly cheaper; equal cost is OCEAN.
pub fn cheaper_mode(air_cost_usd: f64, ocean_cost_usd: f64) -> FreightMode {
    if air_cost_usd < ocean_cost_usd {
        FreightMode::Air
    } else {
        FreightMode::Ocean
    }
}
