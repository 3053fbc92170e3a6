//! Observed daily history for one (product, location) pair.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;

use super::checksum::calculate_checksum;
use crate::error::{CoreError, CoreResult, ErrorContext};

/// One observed day for one (product, location) pair.
///
/// Numeric context fields are optional: the loader leaves them `None` when the
/// source dataset has no value, and the projector substitutes defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub product: String,
    pub location: String,
    #[serde(default)]
    pub units_sold: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub rainfall: Option<f64>,
    #[serde(default)]
    pub congestion_index: Option<f64>,
    #[serde(default)]
    pub holiday_flag: bool,
    #[serde(default)]
    pub promotion_flag: bool,
}

impl TimePoint {
    /// A point with only identity and sales filled in.
    pub fn new(
        date: NaiveDate,
        product: impl Into<String>,
        location: impl Into<String>,
        units_sold: Option<f64>,
    ) -> Self {
        Self {
            date,
            product: product.into(),
            location: location.into(),
            units_sold,
            temperature: None,
            rainfall: None,
            congestion_index: None,
            holiday_flag: false,
            promotion_flag: false,
        }
    }

    pub fn with_weather(mut self, temperature: f64, rainfall: f64) -> Self {
        self.temperature = Some(temperature);
        self.rainfall = Some(rainfall);
        self
    }

    pub fn with_congestion(mut self, congestion_index: f64) -> Self {
        self.congestion_index = Some(congestion_index);
        self
    }
}

/// Date-ordered history for a single (product, location) pair.
///
/// Dates are strictly increasing and unique. Daily contiguity is assumed by the
/// lag and rolling features but not enforced: gaps shift lag semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TimePoint>", into = "Vec<TimePoint>")]
pub struct HistoricalSeries {
    points: Vec<TimePoint>,
}

impl HistoricalSeries {
    /// Validate and wrap an already sorted sequence of points.
    pub fn new(points: Vec<TimePoint>) -> CoreResult<Self> {
        let context = || ErrorContext::new("historical_series").with_entity("history");

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(CoreError::invalid_input_with_context(
                    format!(
                        "dates must be strictly increasing ({} followed by {})",
                        pair[0].date, pair[1].date
                    ),
                    context(),
                ));
            }
        }

        if let Some(first) = points.first() {
            let mixed = points
                .iter()
                .find(|p| p.product != first.product || p.location != first.location);
            if let Some(other) = mixed {
                return Err(CoreError::invalid_input_with_context(
                    format!(
                        "series mixes ({}, {}) with ({}, {})",
                        first.product, first.location, other.product, other.location
                    ),
                    context(),
                ));
            }
        }

        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Filter a mixed dataset down to one pair and sort it by date.
    pub fn select(rows: &[TimePoint], product: &str, location: &str) -> CoreResult<Self> {
        let mut points: Vec<TimePoint> = rows
            .iter()
            .filter(|r| r.product == product && r.location == location)
            .cloned()
            .collect();
        points.sort_by_key(|p| p.date);
        Self::new(points).map_err(|e| e.with_operation("select"))
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TimePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn product(&self) -> Option<&str> {
        self.points.first().map(|p| p.product.as_str())
    }

    pub fn location(&self) -> Option<&str> {
        self.points.first().map(|p| p.location.as_str())
    }

    /// The trailing `n` points (or all of them when shorter).
    pub fn tail(&self, n: usize) -> &[TimePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// Observed units sold on `date`, if the date is present and has a value.
    pub fn units_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .and_then(|idx| self.points[idx].units_sold)
    }

    /// Split off the last `holdout` points.
    ///
    /// Returns the training prefix and the held-out suffix.
    pub fn split_holdout(&self, holdout: usize) -> CoreResult<(HistoricalSeries, &[TimePoint])> {
        if holdout == 0 || holdout >= self.points.len() {
            return Err(CoreError::insufficient_history_with_context(
                format!(
                    "cannot hold out {} of {} observations",
                    holdout,
                    self.points.len()
                ),
                ErrorContext::new("split_holdout").with_entity("history"),
            ));
        }
        let cut = self.points.len() - holdout;
        let train = HistoricalSeries {
            points: self.points[..cut].to_vec(),
        };
        Ok((train, &self.points[cut..]))
    }

    /// SHA-256 fingerprint of the series content.
    ///
    /// Hosts that memoize analyses can key on this value.
    pub fn checksum(&self) -> String {
        let mut content = String::with_capacity(self.points.len() * 48);
        for p in &self.points {
            let _ = writeln!(
                content,
                "{}|{}|{}|{:?}|{:?}|{:?}|{:?}|{}|{}",
                p.date,
                p.product,
                p.location,
                p.units_sold,
                p.temperature,
                p.rainfall,
                p.congestion_index,
                p.holiday_flag as u8,
                p.promotion_flag as u8
            );
        }
        calculate_checksum(&content)
    }
}

impl TryFrom<Vec<TimePoint>> for HistoricalSeries {
    type Error = CoreError;

    fn try_from(points: Vec<TimePoint>) -> Result<Self, Self::Error> {
        HistoricalSeries::new(points)
    }
}

impl From<HistoricalSeries> for Vec<TimePoint> {
    fn from(series: HistoricalSeries) -> Self {
        series.points
    }
}

/// Sorted unique product identities in a mixed dataset.
pub fn distinct_products(rows: &[TimePoint]) -> Vec<String> {
    rows.iter()
        .map(|r| r.product.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted unique location identities in a mixed dataset.
pub fn distinct_locations(rows: &[TimePoint]) -> Vec<String> {
    rows.iter()
        .map(|r| r.location.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
