//! Risk model feature vectors.

use chrono::{Datelike, Weekday};
use std::sync::Arc;

use crate::models::{FeatureVector, FutureFeatureRow};

const EXTREME_COLD: f64 = 0.0;
const EXTREME_HEAT: f64 = 35.0;
const HEAVY_RAIN_MM: f64 = 50.0;
const HIGH_CONGESTION: f64 = 0.7;

const RISK_FEATURES: [&str; 9] = [
    "temperature",
    "rainfall",
    "congestion_index",
    "extreme_temp",
    "heavy_rain",
    "high_congestion",
    "day_of_week",
    "month",
    "is_weekend",
];

/// Column names of the risk feature vector, in order.
pub fn risk_feature_names() -> Arc<[String]> {
    RISK_FEATURES.iter().map(|s| s.to_string()).collect()
}

/// Risk features for one projected row.
///
/// Non-finite context values become 0 before the indicators are derived.
pub fn risk_features(row: &FutureFeatureRow, names: &Arc<[String]>) -> FeatureVector {
    let temperature = finite_or_zero(row.temperature);
    let rainfall = finite_or_zero(row.rainfall);
    let congestion = finite_or_zero(row.congestion_index);
    let weekday = row.date.weekday();

    let values = vec![
        temperature,
        rainfall,
        congestion,
        flag(!(EXTREME_COLD..=EXTREME_HEAT).contains(&temperature)),
        flag(rainfall > HEAVY_RAIN_MM),
        flag(congestion > HIGH_CONGESTION),
        weekday.num_days_from_monday() as f64,
        row.date.month() as f64,
        flag(matches!(weekday, Weekday::Sat | Weekday::Sun)),
    ];

    FeatureVector::from_schema(names.clone(), values)
}

fn flag(on: bool) -> f64 {
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
    use chrono::NaiveDate;

    fn row(date: NaiveDate, temperature: f64, rainfall: f64, congestion: f64) -> FutureFeatureRow {
        FutureFeatureRow {
            date,
            product: "Chairs".into(),
            location: "Austin".into(),
            temperature,
            rainfall,
            congestion_index: congestion,
            holiday_flag: false,
            promotion_flag: false,
            units_sold_seed: 0.0,
        }
    }

    #[test]
    fn test_indicator_thresholds() {
        let names = risk_feature_names();
        // Saturday
        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let calm = risk_features(&row(d, 35.0, 50.0, 0.7), &names);
        assert_eq!(calm.get("extreme_temp"), Some(0.0));
        assert_eq!(calm.get("heavy_rain"), Some(0.0));
        assert_eq!(calm.get("high_congestion"), Some(0.0));
        assert_eq!(calm.get("is_weekend"), Some(1.0));
        assert_eq!(calm.get("day_of_week"), Some(5.0));
        assert_eq!(calm.get("month"), Some(6.0));

        let rough = risk_features(&row(d, -0.5, 50.1, 0.71), &names);
        assert_eq!(rough.get("extreme_temp"), Some(1.0));
        assert_eq!(rough.get("heavy_rain"), Some(1.0));
        assert_eq!(rough.get("high_congestion"), Some(1.0));
    }

    #[test]
    fn test_non_finite_values_become_zero() {
        let names = risk_feature_names();
        let d = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let fv = risk_features(&row(d, f64::NAN, f64::INFINITY, 0.2), &names);

        assert_eq!(fv.len(), 9);
        assert_eq!(fv.get("temperature"), Some(0.0));
        assert_eq!(fv.get("rainfall"), Some(0.0));
        assert_eq!(fv.get("extreme_temp"), Some(0.0));
        assert_eq!(fv.get("is_weekend"), Some(0.0));
    }
}
