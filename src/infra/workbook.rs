//! Reads the BTS ocean-rate workbook into per-lane rate series.
//!
//! Sheet and column names are the publisher's schema and are matched verbatim.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, XlsxError};
use thiserror::Error;
use time::Date;
use tracing::{debug, info};

use crate::domain::{LaneDirection, RateBook, RateCell, RateSeries};
use crate::util::dates::{excel_serial_to_date, parse_iso_date};

pub const COL_DATE: &str = "Date";

/// Where one lane's history lives inside the workbook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneSheet {
    pub direction: LaneDirection,
    pub sheet: &'static str,
    pub rate_column: &'static str,
}

pub const INBOUND_SHEET: LaneSheet = LaneSheet {
    direction: LaneDirection::Inbound,
    sheet: "data_forFigureInbound",
    rate_column: "From Central China (Shanghai) to U.S. West Coast (Los Angeles)",
};

pub const OUTBOUND_SHEET: LaneSheet = LaneSheet {
    direction: LaneDirection::Outbound,
    sheet: "data_forFigureOutbound",
    rate_column: "From U.S. West Coast (Los Angeles) to Central China (Shanghai)",
};

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("workbook could not be opened: {0}")]
    Open(#[from] XlsxError),
    #[error("sheet `{0}` not found")]
    MissingSheet(String),
    #[error("sheet `{0}` has no header row")]
    EmptySheet(String),
    #[error("sheet `{sheet}` has no `{column}` column")]
    MissingColumn { sheet: String, column: String },
}

/// Parses both lane sheets out of raw `.xlsx` bytes.
pub fn parse_workbook(bytes: &[u8]) -> Result<RateBook, WorkbookError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheet_names = workbook.sheet_names();

    let mut read_lane = |lane: &LaneSheet| -> Result<RateSeries, WorkbookError> {
        if !sheet_names.iter().any(|name| name == lane.sheet) {
            return Err(WorkbookError::MissingSheet(lane.sheet.to_string()));
        }
        let range = workbook.worksheet_range(lane.sheet)?;
        series_from_rows(lane, range.rows())
    };

    let inbound = read_lane(&INBOUND_SHEET)?;
    let outbound = read_lane(&OUTBOUND_SHEET)?;
    Ok(RateBook::new(inbound, outbound))
}

/// Builds a lane series from sheet rows; the first row is the header.
/// Rows with an unreadable date or a non-numeric rate are skipped.
pub fn series_from_rows<'a>(
    lane: &LaneSheet,
    rows: impl IntoIterator<Item = &'a [Data]>,
) -> Result<RateSeries, WorkbookError> {
    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| WorkbookError::EmptySheet(lane.sheet.to_string()))?;

    let column = |name: &str| {
        header
            .iter()
            .position(|cell| cell.to_string().trim() == name)
            .ok_or_else(|| WorkbookError::MissingColumn {
                sheet: lane.sheet.to_string(),
                column: name.to_string(),
            })
    };
    let date_idx = column(COL_DATE)?;
    let rate_idx = column(lane.rate_column)?;

    let mut total = 0_usize;
    let cells: Vec<(Date, RateCell)> = rows
        .inspect(|_| total += 1)
        .filter_map(|row| {
            let date = row.get(date_idx).and_then(cell_date)?;
            let rate = row.get(rate_idx).map(rate_cell).unwrap_or(RateCell::Missing);
            Some((date, rate))
        })
        .collect();

    let series = RateSeries::from_cells(lane.direction, cells);
    let dropped = total - series.len();
    if dropped > 0 {
        debug!(sheet = lane.sheet, dropped, "skipped rows without a date or numeric rate");
    }
    info!(
        lane = lane.direction.lane_name(),
        points = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "loaded ocean rate series"
    );
    Ok(series)
}

fn cell_date(cell: &Data) -> Option<Date> {
    match cell {
        Data::DateTime(value) => excel_serial_to_date(value.as_f64()),
        Data::Float(serial) => excel_serial_to_date(*serial),
        Data::Int(serial) => excel_serial_to_date(*serial as f64),
        Data::DateTimeIso(raw) | Data::String(raw) => parse_iso_date(raw).ok(),
        _ => None,
    }
}

fn rate_cell(cell: &Data) -> RateCell {
    match cell {
        Data::Float(value) => RateCell::Number(*value),
        Data::Int(value) => RateCell::Number(*value as f64),
        Data::String(raw) => RateCell::Text(raw.clone()),
        _ => RateCell::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use time::macros::date;

    fn header(lane: &LaneSheet) -> Vec<Data> {
        vec![
            Data::String(COL_DATE.into()),
            Data::String("Some other lane".into()),
            Data::String(lane.rate_column.into()),
        ]
    }

    #[test]
    fn reads_serial_and_iso_dates_and_skips_bad_rows() {
        let rows = vec![
            header(&INBOUND_SHEET),
            vec![Data::Float(45292.0), Data::Float(1.0), Data::Float(2100.0)],
            vec![Data::String("2024-02-01".into()), Data::Empty, Data::Int(2300)],
            vec![Data::Float(45352.0), Data::Empty, Data::String("--".into())],
            vec![Data::Empty, Data::Empty, Data::Float(9999.0)],
            vec![Data::Float(45383.0), Data::Empty],
        ];

        let series = series_from_rows(&INBOUND_SHEET, rows.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(series.direction(), LaneDirection::Inbound);
        let points: Vec<(Date, f64)> = series
            .points()
            .iter()
            .map(|p| (p.date, p.rate_usd_40ft))
            .collect();
        assert_eq!(
            points,
            vec![(date!(2024 - 01 - 01), 2100.0), (date!(2024 - 02 - 01), 2300.0)]
        );
    }

    #[test]
    fn missing_rate_column_is_a_schema_problem() {
        let rows = vec![header(&INBOUND_SHEET)];
        let err = series_from_rows(&OUTBOUND_SHEET, rows.iter().map(Vec::as_slice)).unwrap_err();
        assert!(matches!(err, WorkbookError::MissingColumn { .. }));
    }

    #[test]
    fn empty_sheet_is_rejected() {
        let rows: Vec<Vec<Data>> = Vec::new();
        let err = series_from_rows(&INBOUND_SHEET, rows.iter().map(Vec::as_slice)).unwrap_err();
        assert!(matches!(err, WorkbookError::EmptySheet(_)));
    }

    #[test]
    fn garbage_bytes_are_not_a_workbook() {
        assert!(matches!(
            parse_workbook(b"definitely not a zip archive"),
            Err(WorkbookError::Open(_))
        ));
    }
}
