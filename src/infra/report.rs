//! Result file output and the console mode summary.

use std::{
    fmt::Write as _,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use thiserror::Error;
use time::Date;
use tracing::info;

use crate::domain::{
    DecisionBasis, FreightMode, LaneDirection, ModeSummary, ShipmentFailure, ShipmentResult,
};
use crate::util::dates::iso_date;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Header of the result CSV; matches the field order of `ResultRow`.
pub const RESULT_COLUMNS: [&str; 28] = [
    "shipment_id",
    "ship_date",
    "incoterm",
    "length_cm",
    "width_cm",
    "height_cm",
    "pieces",
    "actual_weight_kg",
    "max_transit_days",
    "container_utilization",
    "direction",
    "vol_weight_kg",
    "chg_weight_kg",
    "vol_to_actual_ratio",
    "vol_weight_kg_pack10",
    "chg_weight_kg_pack10",
    "chg_weight_delta_kg_pack10",
    "ocean_rate_usd_40ft",
    "air_cost_usd",
    "ocean_cost_usd",
    "air_transit_days",
    "ocean_transit_days",
    "air_meets_sla",
    "ocean_meets_sla",
    "recommended_mode",
    "decision_basis",
    "cost_delta_air_minus_ocean_usd",
    "cheaper_mode",
];

/// Flat output row: input columns followed by derived columns.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    shipment_id: &'a str,
    #[serde(serialize_with = "iso_date::serialize")]
    ship_date: Date,
    incoterm: &'a str,
    length_cm: f64,
    width_cm: f64,
    height_cm: f64,
    pieces: u32,
    actual_weight_kg: f64,
    max_transit_days: u32,
    container_utilization: f64,
    direction: LaneDirection,
    vol_weight_kg: f64,
    chg_weight_kg: f64,
    vol_to_actual_ratio: Option<f64>,
    vol_weight_kg_pack10: f64,
    chg_weight_kg_pack10: f64,
    chg_weight_delta_kg_pack10: f64,
    ocean_rate_usd_40ft: f64,
    air_cost_usd: f64,
    ocean_cost_usd: f64,
    air_transit_days: u32,
    ocean_transit_days: u32,
    air_meets_sla: bool,
    ocean_meets_sla: bool,
    recommended_mode: FreightMode,
    decision_basis: DecisionBasis,
    cost_delta_air_minus_ocean_usd: f64,
    cheaper_mode: FreightMode,
}

impl<'a> From<&'a ShipmentResult> for ResultRow<'a> {
    fn from(result: &'a ShipmentResult) -> Self {
        let shipment = &result.shipment;
        Self {
            shipment_id: &shipment.shipment_id,
            ship_date: shipment.ship_date,
            incoterm: &shipment.incoterm,
            length_cm: shipment.length_cm,
            width_cm: shipment.width_cm,
            height_cm: shipment.height_cm,
            pieces: shipment.pieces,
            actual_weight_kg: shipment.actual_weight_kg,
            max_transit_days: shipment.max_transit_days,
            container_utilization: shipment.container_utilization,
            direction: shipment.direction,
            vol_weight_kg: result.vol_weight_kg,
            chg_weight_kg: result.chg_weight_kg,
            vol_to_actual_ratio: result.vol_to_actual_ratio,
            vol_weight_kg_pack10: result.vol_weight_kg_pack10,
            chg_weight_kg_pack10: result.chg_weight_kg_pack10,
            chg_weight_delta_kg_pack10: result.chg_weight_delta_kg_pack10,
            ocean_rate_usd_40ft: result.ocean_rate_usd_40ft,
            air_cost_usd: result.air_cost_usd,
            ocean_cost_usd: result.ocean_cost_usd,
            air_transit_days: result.air_transit_days,
            ocean_transit_days: result.ocean_transit_days,
            air_meets_sla: result.air_meets_sla,
            ocean_meets_sla: result.ocean_meets_sla,
            recommended_mode: result.recommended_mode,
            decision_basis: result.decision_basis,
            cost_delta_air_minus_ocean_usd: result.cost_delta_air_minus_ocean_usd,
            cheaper_mode: result.cheaper_mode,
        }
    }
}

pub fn write_results(
    path: &Path,
    format: OutputFormat,
    results: &[ShipmentResult],
) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    match format {
        OutputFormat::Csv => write_csv(&mut writer, results)?,
        OutputFormat::Json => write_json(&mut writer, results)?,
    }
    writer.flush().map_err(io_err)?;
    info!(path = %path.display(), rows = results.len(), "wrote results");
    Ok(())
}

pub fn write_csv<W: Write>(writer: W, results: &[ShipmentResult]) -> Result<(), ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    // The header is only emitted with the first serialized row.
    if results.is_empty() {
        csv.write_record(RESULT_COLUMNS)?;
    }
    for result in results {
        csv.serialize(ResultRow::from(result))?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, results: &[ShipmentResult]) -> Result<(), ReportError> {
    let rows: Vec<ResultRow<'_>> = results.iter().map(ResultRow::from).collect();
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

/// Console table of the per-mode summary, followed by any skipped shipments.
pub fn render_summary(summaries: &[ModeSummary], failures: &[ShipmentFailure]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>9} {:>13} {:>15} {:>12} {:>14} {:>14}",
        "recommended_mode",
        "shipments",
        "avg_air_cost",
        "avg_ocean_cost",
        "pct_sla_air",
        "pct_sla_ocean",
        "sla_violations"
    );
    for row in summaries {
        let _ = writeln!(
            out,
            "{:<16} {:>9} {:>13.2} {:>15.2} {:>11.1}% {:>13.1}% {:>14}",
            row.mode.label(),
            row.shipments,
            row.avg_air_cost_usd,
            row.avg_ocean_cost_usd,
            row.air_sla_rate * 100.0,
            row.ocean_sla_rate * 100.0,
            row.sla_violations
        );
    }
    if !failures.is_empty() {
        let _ = writeln!(out, "\nSkipped {} shipment(s):", failures.len());
        for failure in failures {
            let _ = writeln!(out, "  {}: {}", failure.shipment_id, failure.reason);
        }
    }
    out
}
