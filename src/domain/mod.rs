//! Costing and mode-decision logic. Pure functions over in-memory values; no I/O.

pub mod costing;
pub mod decision;
pub mod entities;
pub mod pipeline;
pub mod rate_series;
pub mod sensitivity;
pub mod summary;
pub mod weight;

pub use costing::{air_cost_usd, ocean_cost_usd};
pub use decision::{cheaper_mode, recommend_mode, DecisionBasis, ModeDecision};
pub use entities::{
    FreightMode, LaneDirection, PipelineConfig, RatePoint, Shipment, ShipmentResult,
};
pub use pipeline::{
    evaluate_shipment, run_pipeline, sort_results, validate_shipment, PipelineReport, RateBook,
    ShipmentError, ShipmentFailure,
};
pub use rate_series::{EmptySeriesError, RateCell, RateSeries};
pub use sensitivity::{packaging_scenario, vol_to_actual_ratio, PackagingScenario};
pub use summary::{summarize_by_mode, ModeSummary};
pub use weight::{chargeable_weight_kg, volumetric_weight_kg, weigh, WeightProfile};
