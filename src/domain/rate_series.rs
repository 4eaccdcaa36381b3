//! Lane-specific ocean rate history with nearest-date lookup.

use thiserror::Error;
use time::Date;

use super::entities::{LaneDirection, RatePoint};

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("no usable ocean rate points for the {direction} lane")]
pub struct EmptySeriesError {
    pub direction: LaneDirection,
}

/// A raw rate cell as it arrives from the rate source, before numeric filtering.
#[derive(Clone, Debug, PartialEq)]
pub enum RateCell {
    Number(f64),
    Text(String),
    Missing,
}

impl RateCell {
    /// Numeric value of the cell, if it has a finite one.
    pub fn as_rate(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(raw) => raw.trim().parse::<f64>().ok(),
            Self::Missing => None,
        }
        .filter(|value| value.is_finite())
    }
}

/// Observed ocean rates for one lane, ordered by date ascending.
#[derive(Clone, Debug, PartialEq)]
pub struct RateSeries {
    direction: LaneDirection,
    points: Vec<RatePoint>,
}

impl RateSeries {
    /// Builds a series from already-numeric points. Non-finite rates are dropped and
    /// the remainder is stable-sorted by date, so equal dates keep their input order.
    pub fn new(direction: LaneDirection, points: impl IntoIterator<Item = RatePoint>) -> Self {
        let mut points: Vec<RatePoint> = points
            .into_iter()
            .filter(|point| point.rate_usd_40ft.is_finite())
            .collect();
        points.sort_by_key(|point| point.date);
        Self { direction, points }
    }

    /// Builds a series from raw cells, silently skipping rows whose rate is not numeric.
    pub fn from_cells(
        direction: LaneDirection,
        rows: impl IntoIterator<Item = (Date, RateCell)>,
    ) -> Self {
        Self::new(
            direction,
            rows.into_iter()
                .filter_map(|(date, cell)| cell.as_rate().map(|rate| RatePoint::new(date, rate))),
        )
    }

    pub fn direction(&self) -> LaneDirection {
        self.direction
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<Date> {
        self.points.first().map(|point| point.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|point| point.date)
    }

    /// Rate of the observation closest in time to `date`.
    pub fn nearest(&self, date: Date) -> Result<f64, EmptySeriesError> {
        self.nearest_point(date).map(|point| point.rate_usd_40ft)
    }

    /// Observation closest in time to `date`. Equidistant points resolve to the
    /// earliest one in date order.
    pub fn nearest_point(&self, date: Date) -> Result<&RatePoint, EmptySeriesError> {
        // min_by_key keeps the first of several equal minima.
        self.points
            .iter()
            .min_by_key(|point| (point.date - date).abs())
            .ok_or(EmptySeriesError {
                direction: self.direction,
            })
    }
}
