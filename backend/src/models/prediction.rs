//! Projected feature rows, prediction series and safe windows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ErrorContext};

/// A projected day in the forecast horizon.
///
/// `units_sold_seed` only seeds lag and rolling features; it is never reported
/// as a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureFeatureRow {
    pub date: NaiveDate,
    pub product: String,
    pub location: String,
    pub temperature: f64,
    pub rainfall: f64,
    pub congestion_index: f64,
    pub holiday_flag: bool,
    pub promotion_flag: bool,
    pub units_sold_seed: f64,
}

/// Date-aligned demand and risk predictions.
///
/// `dates`, `demand` and `risk` always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPredictionSeries")]
pub struct PredictionSeries {
    dates: Vec<NaiveDate>,
    demand: Vec<f64>,
    risk: Vec<f64>,
}

#[derive(Deserialize)]
struct RawPredictionSeries {
    dates: Vec<NaiveDate>,
    demand: Vec<f64>,
    risk: Vec<f64>,
}

impl TryFrom<RawPredictionSeries> for PredictionSeries {
    type Error = CoreError;

    fn try_from(raw: RawPredictionSeries) -> Result<Self, Self::Error> {
        PredictionSeries::new(raw.dates, raw.demand, raw.risk)
    }
}

impl PredictionSeries {
    pub fn new(dates: Vec<NaiveDate>, demand: Vec<f64>, risk: Vec<f64>) -> CoreResult<Self> {
        if dates.len() != demand.len() || dates.len() != risk.len() {
            return Err(CoreError::invalid_input_with_context(
                format!(
                    "series lengths differ: dates={}, demand={}, risk={}",
                    dates.len(),
                    demand.len(),
                    risk.len()
                ),
                ErrorContext::new("prediction_series"),
            ));
        }
        Ok(Self { dates, demand, risk })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn demand(&self) -> &[f64] {
        &self.demand
    }

    pub fn risk(&self) -> &[f64] {
        &self.risk
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn mean_demand(&self) -> f64 {
        mean(&self.demand)
    }

    pub fn mean_risk(&self) -> f64 {
        mean(&self.risk)
    }

    /// Highest risk in the series, 0 when empty.
    pub fn peak_risk(&self) -> f64 {
        self.risk.iter().copied().fold(0.0, f64::max)
    }

    /// Row view of the series, one entry per date.
    pub fn rows(&self) -> impl Iterator<Item = PredictionRow> + '_ {
        self.dates
            .iter()
            .zip(self.demand.iter())
            .zip(self.risk.iter())
            .map(|((date, demand), risk)| PredictionRow {
                date: *date,
                demand: *demand,
                risk: *risk,
            })
    }
}

/// One row of a [`PredictionSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub date: NaiveDate,
    pub demand: f64,
    pub risk: f64,
}

/// The longest run of consecutive days with risk strictly below a threshold.
///
/// `start_index` / `end_index` point into the series the window was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub length_days: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl SafeWindow {
    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn contains_index(&self, idx: usize) -> bool {
        idx >= self.start_index && idx <= self.end_index
    }
}

/// Human-readable bucket for a disruption probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_probability(risk: f64) -> Self {
        if risk < 0.2 {
            RiskLevel::VeryLow
        } else if risk < 0.4 {
            RiskLevel::Low
        } else if risk < 0.6 {
            RiskLevel::Moderate
        } else if risk < 0.8 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Very Low",
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        start.iter_days().take(n).collect()
    }

    #[test]
    fn test_series_rejects_mismatched_lengths() {
        let err = PredictionSeries::new(dates(3), vec![1.0; 3], vec![0.1; 2]).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_series_summary_stats() {
        let series =
            PredictionSeries::new(dates(3), vec![10.0, 20.0, 30.0], vec![0.1, 0.9, 0.2]).unwrap();
        assert_eq!(series.mean_demand(), 20.0);
        assert!((series.mean_risk() - 0.4).abs() < 1e-12);
        assert_eq!(series.peak_risk(), 0.9);
        assert_eq!(series.rows().nth(1).unwrap().demand, 20.0);
    }

    #[test]
    fn test_empty_series_stats_are_zero() {
        let series = PredictionSeries::new(vec![], vec![], vec![]).unwrap();
        assert_eq!(series.mean_demand(), 0.0);
        assert_eq!(series.peak_risk(), 0.0);
    }

    #[test]
    fn test_risk_levels() {
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::VeryLow);
        assert_eq!(RiskLevel::from_probability(0.2), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.59), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.8), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::High.label(), "High");
    }

    #[test]
    fn test_window_containment_is_inclusive() {
        let d = dates(5);
        let window = SafeWindow {
            start_date: d[1],
            end_date: d[3],
            length_days: 3,
            start_index: 1,
            end_index: 3,
        };
        assert!(!window.contains(d[0]));
        assert!(window.contains(d[1]));
        assert!(window.contains(d[3]));
        assert!(!window.contains(d[4]));
        assert!(window.contains_index(2));
    }

    #[test]
    fn test_series_deserialize_validates_lengths() {
        let json = r#"{"dates": ["2024-01-01"], "demand": [1.0, 2.0], "risk": [0.1]}"#;
        assert!(serde_json::from_str::<PredictionSeries>(json).is_err());
    }
}
