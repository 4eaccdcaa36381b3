//! Explainable air-vs-ocean freight mode recommendations.
//!
//! [`domain`] holds the costing and decision pipeline, [`infra`] the rate workbook,
//! cache and batch-file collaborators, and [`app`] wires them into a run.

pub mod app;
pub mod domain;
pub mod infra;
pub mod util;
