//! Per-shipment costing pipeline and batch orchestration.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    costing::{air_cost_usd, ocean_cost_usd},
    decision::{cheaper_mode, recommend_mode},
    entities::{LaneDirection, PipelineConfig, Shipment, ShipmentResult},
    rate_series::{EmptySeriesError, RateSeries},
    sensitivity::{packaging_scenario, vol_to_actual_ratio},
    weight::weigh,
};

/// The two lane histories a run prices against.
#[derive(Clone, Debug, PartialEq)]
pub struct RateBook {
    inbound: RateSeries,
    outbound: RateSeries,
}

impl RateBook {
    /// Series are filed by their own direction, not by argument position.
    /// The two series must cover different lanes.
    pub fn new(first: RateSeries, second: RateSeries) -> Self {
        debug_assert_ne!(
            first.direction(),
            second.direction(),
            "rate book needs one series per lane"
        );
        if first.direction() == LaneDirection::Outbound {
            Self {
                inbound: second,
                outbound: first,
            }
        } else {
            Self {
                inbound: first,
                outbound: second,
            }
        }
    }

    pub fn for_direction(&self, direction: LaneDirection) -> &RateSeries {
        match direction {
            LaneDirection::Inbound => &self.inbound,
            LaneDirection::Outbound => &self.outbound,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ShipmentError {
    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: String },
    #[error(transparent)]
    EmptySeries(#[from] EmptySeriesError),
}

/// A shipment that produced no result, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShipmentFailure {
    pub shipment_id: String,
    pub reason: String,
}

impl ShipmentFailure {
    pub fn new(shipment_id: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineReport {
    /// Sorted by ship date, then shipment id.
    pub results: Vec<ShipmentResult>,
    /// Sorted by shipment id.
    pub failures: Vec<ShipmentFailure>,
}

/// Rejects physically meaningless rows before any costing happens.
pub fn validate_shipment(shipment: &Shipment) -> Result<(), ShipmentError> {
    let measures = [
        ("length_cm", shipment.length_cm),
        ("width_cm", shipment.width_cm),
        ("height_cm", shipment.height_cm),
        ("actual_weight_kg", shipment.actual_weight_kg),
    ];
    for (field, value) in measures {
        if !value.is_finite() || value < 0.0 {
            return Err(ShipmentError::InvalidInput {
                field,
                value: value.to_string(),
            });
        }
    }
    let counts = [
        ("pieces", shipment.pieces),
        ("max_transit_days", shipment.max_transit_days),
    ];
    for (field, value) in counts {
        if value == 0 {
            return Err(ShipmentError::InvalidInput {
                field,
                value: value.to_string(),
            });
        }
    }
    if shipment.container_utilization.is_nan() {
        return Err(ShipmentError::InvalidInput {
            field: "container_utilization",
            value: shipment.container_utilization.to_string(),
        });
    }
    Ok(())
}

/// Weight -> sensitivity -> rate lookup -> costing -> decision for one shipment.
pub fn evaluate_shipment(
    shipment: &Shipment,
    rates: &RateBook,
    config: &PipelineConfig,
) -> Result<ShipmentResult, ShipmentError> {
    validate_shipment(shipment)?;

    let baseline = weigh(shipment, config.volumetric_divisor);
    let packaging = packaging_scenario(
        shipment,
        &baseline,
        config.volumetric_divisor,
        config.packaging_height_factor,
    );

    let ocean_rate_usd_40ft = rates
        .for_direction(shipment.direction)
        .nearest(shipment.ship_date)?;

    let air_cost = air_cost_usd(
        baseline.chargeable_kg,
        config.air_usd_per_chg_kg,
        config.air_min_charge_usd,
    );
    let ocean_cost = ocean_cost_usd(ocean_rate_usd_40ft, shipment.container_utilization);

    let decision = recommend_mode(
        air_cost,
        ocean_cost,
        config.air_transit_days,
        config.ocean_transit_days,
        shipment.max_transit_days,
    );
    debug!(
        shipment_id = %shipment.shipment_id,
        mode = %decision.mode,
        basis = %decision.basis,
        "{}",
        decision.rationale(air_cost, ocean_cost)
    );

    Ok(ShipmentResult {
        shipment: shipment.clone(),
        vol_weight_kg: baseline.volumetric_kg,
        chg_weight_kg: baseline.chargeable_kg,
        vol_to_actual_ratio: vol_to_actual_ratio(baseline.volumetric_kg, shipment.actual_weight_kg),
        vol_weight_kg_pack10: packaging.volumetric_kg,
        chg_weight_kg_pack10: packaging.chargeable_kg,
        chg_weight_delta_kg_pack10: packaging.chargeable_delta_kg,
        ocean_rate_usd_40ft,
        air_cost_usd: air_cost,
        ocean_cost_usd: ocean_cost,
        air_transit_days: config.air_transit_days,
        ocean_transit_days: config.ocean_transit_days,
        air_meets_sla: decision.air_meets_sla,
        ocean_meets_sla: decision.ocean_meets_sla,
        recommended_mode: decision.mode,
        decision_basis: decision.basis,
        cost_delta_air_minus_ocean_usd: air_cost - ocean_cost,
        cheaper_mode: cheaper_mode(air_cost, ocean_cost),
    })
}

/// Evaluates every shipment independently and in parallel. A failing shipment is
/// reported in `failures` and never affects the others.
pub fn run_pipeline(
    shipments: &[Shipment],
    rates: &RateBook,
    config: &PipelineConfig,
) -> PipelineReport {
    let outcomes: Vec<Result<ShipmentResult, ShipmentFailure>> = shipments
        .par_iter()
        .map(|shipment| {
            evaluate_shipment(shipment, rates, config)
                .map_err(|err| ShipmentFailure::new(shipment.shipment_id.clone(), err))
        })
        .collect();

    let mut report = PipelineReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(result) => report.results.push(result),
            Err(failure) => {
                warn!(shipment_id = %failure.shipment_id, reason = %failure.reason, "shipment skipped");
                report.failures.push(failure);
            }
        }
    }

    sort_results(&mut report.results);
    report
        .failures
        .sort_by(|a, b| a.shipment_id.cmp(&b.shipment_id));

    info!(
        results = report.results.len(),
        failures = report.failures.len(),
        "pipeline finished"
    );
    report
}

/// Deterministic report order: ship date, then shipment id.
pub fn sort_results(results: &mut [ShipmentResult]) {
    results.sort_by(|a, b| {
        a.shipment
            .ship_date
            .cmp(&b.shipment.ship_date)
            .then_with(|| a.shipment.shipment_id.cmp(&b.shipment.shipment_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{decision::DecisionBasis, entities::FreightMode, entities::RatePoint};
    use pretty_assertions::assert_eq;
    use time::macros::date;

    fn rates() -> RateBook {
        RateBook::new(
            RateSeries::new(
                LaneDirection::Inbound,
                [
                    RatePoint::new(date!(2024 - 01 - 01), 2000.0),
                    RatePoint::new(date!(2024 - 02 - 01), 3000.0),
                ],
            ),
            RateSeries::new(
                LaneDirection::Outbound,
                [RatePoint::new(date!(2024 - 01 - 01), 800.0)],
            ),
        )
    }

    fn shipment(id: &str) -> Shipment {
        Shipment {
            shipment_id: id.into(),
            ship_date: date!(2024 - 01 - 10),
            incoterm: "FOB".into(),
            length_cm: 100.0,
            width_cm: 100.0,
            height_cm: 60.0,
            pieces: 2,
            actual_weight_kg: 150.0,
            max_transit_days: 30,
            container_utilization: 0.25,
            direction: LaneDirection::Inbound,
        }
    }

    #[test]
    fn rate_book_files_series_by_direction() {
        let book = RateBook::new(
            RateSeries::new(LaneDirection::Outbound, [RatePoint::new(date!(2024 - 01 - 01), 1.0)]),
            RateSeries::new(LaneDirection::Inbound, [RatePoint::new(date!(2024 - 01 - 01), 2.0)]),
        );
        assert_eq!(
            book.for_direction(LaneDirection::Inbound).nearest(date!(2024 - 01 - 01)),
            Ok(2.0)
        );
        assert_eq!(
            book.for_direction(LaneDirection::Outbound).nearest(date!(2024 - 01 - 01)),
            Ok(1.0)
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "one series per lane")]
    fn rate_book_rejects_two_series_for_one_lane() {
        RateBook::new(
            RateSeries::new(LaneDirection::Inbound, [RatePoint::new(date!(2024 - 01 - 01), 1.0)]),
            RateSeries::new(LaneDirection::Inbound, [RatePoint::new(date!(2024 - 01 - 01), 2.0)]),
        );
    }

    #[test]
    fn evaluates_a_bulky_inbound_shipment() {
        let result = evaluate_shipment(&shipment("S1"), &rates(), &PipelineConfig::default()).unwrap();

        // 100 x 100 x 60 / 6000 * 2 = 200 kg volumetric.
        assert_eq!(result.vol_weight_kg, 200.0);
        assert_eq!(result.chg_weight_kg, 200.0);
        assert_eq!(result.vol_to_actual_ratio, Some(200.0 / 150.0));
        assert!((result.chg_weight_kg_pack10 - 180.0).abs() < 1e-9);
        assert!((result.chg_weight_delta_kg_pack10 + 20.0).abs() < 1e-9);
        assert_eq!(result.ocean_rate_usd_40ft, 2000.0);
        assert_eq!(result.air_cost_usd, 1300.0);
        assert_eq!(result.ocean_cost_usd, 500.0);
        assert_eq!(result.cost_delta_air_minus_ocean_usd, 800.0);
        assert!(result.air_meets_sla && result.ocean_meets_sla);
        assert_eq!(result.recommended_mode, FreightMode::Ocean);
        assert_eq!(result.decision_basis, DecisionBasis::Cheaper);
        assert_eq!(result.cheaper_mode, FreightMode::Ocean);
    }

    #[test]
    fn tight_sla_overrides_cost_but_not_cheaper_mode() {
        let mut s = shipment("S1");
        s.max_transit_days = 5;
        let result = evaluate_shipment(&s, &rates(), &PipelineConfig::default()).unwrap();
        assert_eq!(result.recommended_mode, FreightMode::Air);
        assert_eq!(result.decision_basis, DecisionBasis::OnlyAirMeetsSla);
        assert_eq!(result.cheaper_mode, FreightMode::Ocean);
    }

    #[test]
    fn outbound_shipments_use_outbound_rates() {
        let mut s = shipment("S1");
        s.direction = LaneDirection::Outbound;
        let result = evaluate_shipment(&s, &rates(), &PipelineConfig::default()).unwrap();
        assert_eq!(result.ocean_rate_usd_40ft, 800.0);
        assert_eq!(result.ocean_cost_usd, 200.0);
    }

    #[test]
    fn config_values_flow_into_costing() {
        let config = PipelineConfig {
            air_usd_per_chg_kg: 1.0,
            air_min_charge_usd: 50.0,
            air_transit_days: 2,
            ocean_transit_days: 40,
            ..PipelineConfig::default()
        };
        let result = evaluate_shipment(&shipment("S1"), &rates(), &config).unwrap();
        assert_eq!(result.air_cost_usd, 200.0);
        assert_eq!(result.air_transit_days, 2);
        assert_eq!(result.ocean_transit_days, 40);
        assert!(!result.ocean_meets_sla);
        assert_eq!(result.recommended_mode, FreightMode::Air);
    }

    #[test]
    fn zero_actual_weight_leaves_ratio_missing() {
        let mut s = shipment("S1");
        s.actual_weight_kg = 0.0;
        let result = evaluate_shipment(&s, &rates(), &PipelineConfig::default()).unwrap();
        assert_eq!(result.vol_to_actual_ratio, None);
    }

    #[test]
    fn invalid_rows_are_rejected() {
        let mut s = shipment("S1");
        s.pieces = 0;
        assert_eq!(
            validate_shipment(&s),
            Err(ShipmentError::InvalidInput {
                field: "pieces",
                value: "0".into()
            })
        );

        let mut s = shipment("S1");
        s.max_transit_days = 0;
        assert_eq!(
            validate_shipment(&s),
            Err(ShipmentError::InvalidInput {
                field: "max_transit_days",
                value: "0".into()
            })
        );

        let mut s = shipment("S1");
        s.height_cm = -1.0;
        assert!(matches!(
            validate_shipment(&s),
            Err(ShipmentError::InvalidInput { field: "height_cm", .. })
        ));

        let mut s = shipment("S1");
        s.container_utilization = f64::NAN;
        assert!(validate_shipment(&s).is_err());

        // Out-of-range utilization is clamped later, not rejected.
        let mut s = shipment("S1");
        s.container_utilization = 1.7;
        assert!(validate_shipment(&s).is_ok());
    }

    #[test]
    fn failures_are_isolated_and_results_sorted() {
        let mut late = shipment("S2");
        late.ship_date = date!(2024 - 03 - 01);
        let mut early_b = shipment("S9");
        early_b.ship_date = date!(2024 - 01 - 02);
        let mut early_a = shipment("S3");
        early_a.ship_date = date!(2024 - 01 - 02);
        let mut broken = shipment("S5");
        broken.width_cm = f64::INFINITY;
        let empty_lane = RateBook::new(
            RateSeries::new(LaneDirection::Inbound, [RatePoint::new(date!(2024 - 01 - 01), 1.0)]),
            RateSeries::new(LaneDirection::Outbound, []),
        );
        let mut outbound = shipment("S4");
        outbound.direction = LaneDirection::Outbound;

        let report = run_pipeline(
            &[late, broken, early_b, outbound, early_a],
            &empty_lane,
            &PipelineConfig::default(),
        );

        let ids: Vec<&str> = report
            .results
            .iter()
            .map(|r| r.shipment.shipment_id.as_str())
            .collect();
        assert_eq!(ids, vec!["S3", "S9", "S2"]);
        assert_eq!(
            report.failures,
            vec![
                ShipmentFailure::new("S4", "no usable ocean rate points for the outbound lane"),
                ShipmentFailure::new("S5", "invalid width_cm: inf"),
            ]
        );
    }
}
