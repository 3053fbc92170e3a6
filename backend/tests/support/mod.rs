//! Shared fixtures for integration tests: synthetic histories and stub predictors.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};

use retail_decision::models::{FeatureVector, HistoricalSeries, TimePoint};
use retail_decision::predictors::{
    CategoryVocabulary, ModelRegistry, PredictorError, PredictorFn, RiskOutput,
};

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Daily points with weekly seasonality; rain spikes every tenth day.
pub fn synthetic_points(days: u64, product: &str, location: &str) -> Vec<TimePoint> {
    (0..days)
        .map(|i| {
            let date = start_date() + Days::new(i);
            let weekend = date.weekday().num_days_from_monday() >= 5;
            let units = if weekend { 65.0 } else { 40.0 } + (i % 3) as f64;
            let rainfall = if i % 10 == 0 { 60.0 } else { 3.0 };
            TimePoint::new(date, product, location, Some(units))
                .with_weather(12.0 + (i % 5) as f64, rainfall)
                .with_congestion(0.35 + (i % 4) as f64 * 0.1)
        })
        .collect()
}

pub fn synthetic_history(days: u64) -> HistoricalSeries {
    HistoricalSeries::new(synthetic_points(days, "Chairs", "Austin")).unwrap()
}

pub fn vocabulary() -> CategoryVocabulary {
    CategoryVocabulary::new(
        "test-v1",
        vec!["Chairs".into(), "Tables".into()],
        vec!["Austin".into(), "Denver".into()],
    )
}

/// Demand follows last week's value; risk is high on weekends and in heavy rain.
pub fn stub_registry() -> ModelRegistry {
    let demand = PredictorFn::new(
        "weekly-naive",
        |f: &FeatureVector| -> Result<f64, PredictorError> {
            let lag = f.get("lag_7").unwrap_or(0.0);
            let promo = f.get("promotion_flag_1").unwrap_or(0.0);
            Ok(lag * (1.0 + 0.2 * promo))
        },
    );
    let risk = PredictorFn::new(
        "rule-risk",
        |f: &FeatureVector| -> Result<RiskOutput, PredictorError> {
            let weekend = f.get("is_weekend").unwrap_or(0.0);
            let rain = f.get("heavy_rain").unwrap_or(0.0);
            let p = (0.1 + 0.4 * weekend + 0.4 * rain).min(1.0);
            Ok(RiskOutput::Probabilities(vec![1.0 - p, p]))
        },
    );

    ModelRegistry::new()
        .with_demand_model(Arc::new(demand), vocabulary())
        .with_risk_model(Arc::new(risk))
}
