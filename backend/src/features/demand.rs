//! Demand model feature vectors.
//!
//! Column order is fixed: context fields, calendar fields, lags, rolling
//! statistics, then one-hot indicators for product, location, holiday and
//! promotion. The one-hot columns follow the [`CategoryVocabulary`] order.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{FeatureVector, FutureFeatureRow, HistoricalSeries};
use crate::predictors::CategoryVocabulary;

/// Lag offsets in days.
pub const LAG_OFFSETS: [usize; 3] = [7, 14, 28];

/// Trailing rolling windows in days.
pub const ROLLING_WINDOWS: [usize; 2] = [7, 28];

/// How future units-sold values feed lag and rolling features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LagMode {
    /// Future days carry the projected seed; all rows are scored in one batch.
    #[default]
    Seeded,
    /// Rows are scored in date order and each prediction replaces its seed.
    Iterative,
}

/// A categorical value outside the model's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} '{value}' for vocabulary {version}")]
pub struct UnknownCategory {
    pub field: &'static str,
    pub value: String,
    pub version: String,
}

/// Units-sold chain of actual history followed by future values.
///
/// Positions are daily steps; gaps in the history are not filled.
#[derive(Debug, Clone)]
pub struct LagChain {
    values: Vec<Option<f64>>,
    history_len: usize,
}

impl LagChain {
    /// History values followed by each row's seed.
    pub fn new(history: &HistoricalSeries, rows: &[FutureFeatureRow]) -> Self {
        let mut values: Vec<Option<f64>> = history
            .points()
            .iter()
            .map(|p| p.units_sold.filter(|v| v.is_finite()))
            .collect();
        let history_len = values.len();
        values.extend(rows.iter().map(|r| Some(r.units_sold_seed)));
        Self {
            values,
            history_len,
        }
    }

    /// Replace the value for future row `row` (iterative mode).
    pub fn set_future(&mut self, row: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(self.history_len + row) {
            *slot = Some(value);
        }
    }

    /// Value `offset` days before future row `row`, 0 when unavailable.
    pub fn lag(&self, row: usize, offset: usize) -> f64 {
        let pos = self.history_len + row;
        pos.checked_sub(offset)
            .and_then(|idx| self.values.get(idx).copied().flatten())
            .unwrap_or(0.0)
    }

    /// Mean over the `window` days before future row `row`.
    pub fn rolling_mean(&self, row: usize, window: usize) -> f64 {
        self.window(row, window)
            .map(|w| w.iter().sum::<f64>() / w.len() as f64)
            .unwrap_or(0.0)
    }

    /// Sample standard deviation over the `window` days before future row `row`.
    pub fn rolling_std(&self, row: usize, window: usize) -> f64 {
        match self.window(row, window) {
            Some(w) if w.len() > 1 => {
                let mean = w.iter().sum::<f64>() / w.len() as f64;
                let var = w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (w.len() - 1) as f64;
                var.sqrt()
            }
            _ => 0.0,
        }
    }

    /// The full trailing window, or `None` if any day in it is unavailable.
    fn window(&self, row: usize, window: usize) -> Option<Vec<f64>> {
        let end = self.history_len + row;
        let start = end.checked_sub(window)?;
        if window == 0 {
            return None;
        }
        self.values.get(start..end)?.iter().copied().collect()
    }
}

/// Assembles demand feature vectors against a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct DemandFeatureBuilder<'a> {
    vocabulary: &'a CategoryVocabulary,
    names: Arc<[String]>,
}

impl<'a> DemandFeatureBuilder<'a> {
    pub fn new(vocabulary: &'a CategoryVocabulary) -> Self {
        let mut names: Vec<String> = [
            "temperature",
            "rainfall",
            "congestion_index",
            "day_of_week",
            "week",
            "month",
            "year",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        names.extend(LAG_OFFSETS.iter().map(|k| format!("lag_{}", k)));
        for w in ROLLING_WINDOWS {
            names.push(format!("roll_mean_{}", w));
            names.push(format!("roll_std_{}", w));
        }
        names.extend(vocabulary.products().iter().map(|p| format!("product_{}", p)));
        names.extend(vocabulary.locations().iter().map(|l| format!("location_{}", l)));
        names.extend(
            ["holiday_flag_0", "holiday_flag_1", "promotion_flag_0", "promotion_flag_1"]
                .iter()
                .map(|s| s.to_string()),
        );

        Self {
            vocabulary,
            names: names.into(),
        }
    }

    pub fn names(&self) -> &Arc<[String]> {
        &self.names
    }

    /// Reject rows whose product or location is outside the vocabulary.
    pub fn check_categories(&self, row: &FutureFeatureRow) -> Result<(), UnknownCategory> {
        let unknown = |field: &'static str, value: &str| UnknownCategory {
            field,
            value: value.to_string(),
            version: self.vocabulary.version().to_string(),
        };
        if !self.vocabulary.contains_product(&row.product) {
            return Err(unknown("product", &row.product));
        }
        if !self.vocabulary.contains_location(&row.location) {
            return Err(unknown("location", &row.location));
        }
        Ok(())
    }

    /// Feature vector for future row `index`, reading lags from `chain`.
    pub fn build(
        &self,
        row: &FutureFeatureRow,
        index: usize,
        chain: &LagChain,
    ) -> Result<FeatureVector, UnknownCategory> {
        self.check_categories(row)?;

        let mut values = Vec::with_capacity(self.names.len());
        values.push(finite_or_zero(row.temperature));
        values.push(finite_or_zero(row.rainfall));
        values.push(finite_or_zero(row.congestion_index));
        values.push(row.date.weekday().num_days_from_monday() as f64);
        values.push(row.date.iso_week().week() as f64);
        values.push(row.date.month() as f64);
        values.push(row.date.year() as f64);

        for k in LAG_OFFSETS {
            values.push(chain.lag(index, k));
        }
        for w in ROLLING_WINDOWS {
            values.push(chain.rolling_mean(index, w));
            values.push(chain.rolling_std(index, w));
        }

        values.extend(self.vocabulary.products().iter().map(|p| indicator(*p == row.product)));
        values.extend(self.vocabulary.locations().iter().map(|l| indicator(*l == row.location)));
        values.push(indicator(!row.holiday_flag));
        values.push(indicator(row.holiday_flag));
        values.push(indicator(!row.promotion_flag));
        values.push(indicator(row.promotion_flag));

        Ok(FeatureVector::from_schema(self.names.clone(), values))
    }
}

fn indicator(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectionSettings;
    use crate::features::project_future;
    use crate::models::TimePoint;
    use chrono::{Days, NaiveDate};

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(offset)
    }

    fn vocab() -> CategoryVocabulary {
        CategoryVocabulary::new(
            "v1",
            vec!["Chairs".into(), "Tables".into()],
            vec!["Austin".into(), "Denver".into()],
        )
    }

    fn setup(history_days: u64, horizon: usize) -> (HistoricalSeries, Vec<FutureFeatureRow>) {
        let points = (0..history_days)
            .map(|i| TimePoint::new(day(i), "Tables", "Austin", Some(i as f64)))
            .collect();
        let history = HistoricalSeries::new(points).unwrap();
        let rows = project_future(&history, horizon, &ProjectionSettings::default(), None).unwrap();
        (history, rows)
    }

    #[test]
    fn test_schema_order() {
        let vocab = vocab();
        let builder = DemandFeatureBuilder::new(&vocab);
        let names = builder.names();

        assert_eq!(names.len(), 7 + 3 + 4 + 2 + 2 + 4);
        assert_eq!(names[0], "temperature");
        assert_eq!(names[7], "lag_7");
        assert_eq!(names[10], "roll_mean_7");
        assert_eq!(names[13], "roll_std_28");
        assert_eq!(names[14], "product_Chairs");
        assert_eq!(names[16], "location_Austin");
        assert_eq!(names[names.len() - 1], "promotion_flag_1");
    }

    #[test]
    fn test_lags_read_history_then_seed() {
        let (history, rows) = setup(40, 10);
        let chain = LagChain::new(&history, &rows);
        let seed = rows[0].units_sold_seed;

        // first future position is 40; lag 7 reaches day 33
        assert_eq!(chain.lag(0, 7), 33.0);
        assert_eq!(chain.lag(0, 28), 12.0);
        // row 8 at position 48; lag 7 reaches future position 41 (seed)
        assert_eq!(chain.lag(8, 7), seed);
    }

    #[test]
    fn test_rolling_requires_full_window() {
        let (history, rows) = setup(10, 3);
        let chain = LagChain::new(&history, &rows);

        // days 3..=9
        assert_eq!(chain.rolling_mean(0, 7), 6.0);
        let expected_std = (28.0f64 / 6.0).sqrt();
        assert!((chain.rolling_std(0, 7) - expected_std).abs() < 1e-12);
        assert_eq!(chain.rolling_mean(0, 28), 0.0);
        assert_eq!(chain.rolling_std(0, 28), 0.0);
    }

    #[test]
    fn test_missing_history_value_breaks_window() {
        let mut points: Vec<TimePoint> = (0..10)
            .map(|i| TimePoint::new(day(i), "Tables", "Austin", Some(1.0)))
            .collect();
        points[8].units_sold = None;
        let history = HistoricalSeries::new(points).unwrap();
        let rows = project_future(&history, 1, &ProjectionSettings::default(), None).unwrap();
        let chain = LagChain::new(&history, &rows);

        assert_eq!(chain.rolling_mean(0, 7), 0.0);
        assert_eq!(chain.lag(0, 2), 0.0);
        assert_eq!(chain.lag(0, 1), 1.0);
    }

    #[test]
    fn test_set_future_feeds_later_lags() {
        let (history, rows) = setup(30, 10);
        let mut chain = LagChain::new(&history, &rows);
        chain.set_future(0, 500.0);
        assert_eq!(chain.lag(7, 7), 500.0);
    }

    #[test]
    fn test_build_values() {
        let vocab = vocab();
        let builder = DemandFeatureBuilder::new(&vocab);
        let (history, mut rows) = setup(30, 2);
        rows[0].holiday_flag = true;
        let chain = LagChain::new(&history, &rows);

        let fv = builder.build(&rows[0], 0, &chain).unwrap();
        // 2024-01-31 is a Wednesday in ISO week 5
        assert_eq!(fv.get("day_of_week"), Some(2.0));
        assert_eq!(fv.get("week"), Some(5.0));
        assert_eq!(fv.get("month"), Some(1.0));
        assert_eq!(fv.get("year"), Some(2024.0));
        assert_eq!(fv.get("product_Tables"), Some(1.0));
        assert_eq!(fv.get("product_Chairs"), Some(0.0));
        assert_eq!(fv.get("location_Austin"), Some(1.0));
        assert_eq!(fv.get("holiday_flag_1"), Some(1.0));
        assert_eq!(fv.get("holiday_flag_0"), Some(0.0));
        assert_eq!(fv.get("promotion_flag_0"), Some(1.0));
        assert_eq!(fv.len(), builder.names().len());
    }

    #[test]
    fn test_unknown_product_is_rejected() {
        let vocab = CategoryVocabulary::new("v3", vec!["Chairs".into()], vec!["Austin".into()]);
        let builder = DemandFeatureBuilder::new(&vocab);
        let (history, rows) = setup(10, 1);
        let chain = LagChain::new(&history, &rows);

        let err = builder.build(&rows[0], 0, &chain).unwrap_err();
        assert_eq!(err.field, "product");
        assert_eq!(err.value, "Tables");
        assert!(err.to_string().contains("v3"));
    }

    #[test]
    fn test_lag_mode_parses_lowercase() {
        let mode: LagMode = serde_json::from_str("\"iterative\"").unwrap();
        assert_eq!(mode, LagMode::Iterative);
        assert_eq!(LagMode::default(), LagMode::Seeded);
    }
}
