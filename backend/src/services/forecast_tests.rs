#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;

    use crate::config::ProjectionSettings;
    use crate::error::{Diagnostic, ModelKind};
    use crate::features::{project_future, LagMode};
    use crate::models::{FeatureVector, FutureFeatureRow, HistoricalSeries, TimePoint};
    use crate::predictors::{
        CategoryVocabulary, DemandPredictor, ModelRegistry, PredictorError, PredictorFn,
    };
    use crate::services::forecast::{forecast_demand, ForecastEngine};

    fn history(days: u64, units: f64) -> HistoricalSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = (0..days)
            .map(|i| {
                TimePoint::new(start + Days::new(i), "Chairs", "Austin", Some(units))
                    .with_weather(15.0, 3.0)
                    .with_congestion(0.4)
            })
            .collect();
        HistoricalSeries::new(points).unwrap()
    }

    fn rows(history: &HistoricalSeries, horizon: usize) -> Vec<FutureFeatureRow> {
        project_future(history, horizon, &ProjectionSettings::default(), None).unwrap()
    }

    fn vocab() -> CategoryVocabulary {
        CategoryVocabulary::new("v1", vec!["Chairs".into()], vec!["Austin".into()])
    }

    fn registry_with<F>(f: F) -> ModelRegistry
    where
        F: Fn(&FeatureVector) -> Result<f64, PredictorError> + Send + Sync + 'static,
    {
        ModelRegistry::new().with_demand_model(Arc::new(PredictorFn::new("stub", f)), vocab())
    }

    /// Returns one value fewer than requested.
    struct ShortBatch;

    impl DemandPredictor for ShortBatch {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, PredictorError> {
            Ok(1.0)
        }

        fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, PredictorError> {
            Ok(vec![1.0; rows.len().saturating_sub(1)])
        }
    }

    #[test]
    fn test_missing_model_returns_zeros() {
        let h = history(30, 10.0);
        let r = rows(&h, 5);
        let outcome = forecast_demand(&h, &r, None, LagMode::Seeded);

        assert_eq!(outcome.value, vec![0.0; 5]);
        assert_eq!(
            outcome.diagnostic,
            Some(Diagnostic::ModelNotLoaded {
                model: ModelKind::Demand
            })
        );
    }

    #[test]
    fn test_negative_predictions_are_clamped() {
        let h = history(30, 10.0);
        let r = rows(&h, 3);
        let registry = registry_with(|_| Ok(-4.0));
        let outcome = ForecastEngine::new(&registry, LagMode::Seeded).forecast_demand(&h, &r);

        assert_eq!(outcome.value, vec![0.0; 3]);
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn test_predictor_failure_falls_back() {
        let h = history(30, 10.0);
        let r = rows(&h, 4);
        let registry = registry_with(|_| Err(PredictorError::Failed("boom".into())));
        let outcome = ForecastEngine::new(&registry, LagMode::Seeded).forecast_demand(&h, &r);

        assert_eq!(outcome.value, vec![0.0; 4]);
        match outcome.diagnostic {
            Some(Diagnostic::PredictionUnavailable { model, reason }) => {
                assert_eq!(model, ModelKind::Demand);
                assert!(reason.contains("boom"));
            }
            other => panic!("unexpected diagnostic {:?}", other),
        }
    }

    #[test]
    fn test_nan_prediction_is_malformed() {
        let h = history(30, 10.0);
        let r = rows(&h, 2);
        let registry = registry_with(|_| Ok(f64::NAN));
        let outcome = ForecastEngine::new(&registry, LagMode::Seeded).forecast_demand(&h, &r);

        assert_eq!(outcome.value, vec![0.0; 2]);
        assert_eq!(outcome.diagnostic.unwrap().code(), "PREDICTION_UNAVAILABLE");
    }

    #[test]
    fn test_short_batch_is_malformed() {
        let h = history(30, 10.0);
        let r = rows(&h, 6);
        let registry = ModelRegistry::new().with_demand_model(Arc::new(ShortBatch), vocab());
        let outcome = ForecastEngine::new(&registry, LagMode::Seeded).forecast_demand(&h, &r);

        assert_eq!(outcome.value.len(), 6);
        assert!(outcome.value.iter().all(|v| *v == 0.0));
        assert_eq!(outcome.diagnostic.unwrap().code(), "PREDICTION_UNAVAILABLE");
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let h = history(30, 10.0);
        let mut r = rows(&h, 2);
        r[1].location = "Boston".into();
        let registry = registry_with(|_| Ok(5.0));
        let outcome = ForecastEngine::new(&registry, LagMode::Seeded).forecast_demand(&h, &r);

        assert_eq!(outcome.value, vec![0.0; 2]);
        match outcome.diagnostic {
            Some(Diagnostic::PredictionUnavailable { reason, .. }) => {
                assert!(reason.contains("Boston"))
            }
            other => panic!("unexpected diagnostic {:?}", other),
        }
    }

    #[test]
    fn test_seeded_lags_use_seed() {
        let h = history(30, 10.0);
        let r = rows(&h, 15);
        let registry = registry_with(|f| Ok(f.get("lag_7").unwrap_or(0.0) + 1.0));
        let outcome = ForecastEngine::new(&registry, LagMode::Seeded).forecast_demand(&h, &r);

        assert_eq!(outcome.value, vec![11.0; 15]);
    }

    #[test]
    fn test_iterative_lags_feed_predictions_forward() {
        let h = history(30, 10.0);
        let r = rows(&h, 15);
        let registry = registry_with(|f| Ok(f.get("lag_7").unwrap_or(0.0) + 1.0));
        let engine = ForecastEngine::new(&registry, LagMode::Iterative);
        assert_eq!(engine.lag_mode(), LagMode::Iterative);

        let values = engine.forecast_demand(&h, &r).value;
        assert_eq!(values[0], 11.0);
        assert_eq!(values[6], 11.0);
        assert_eq!(values[7], 12.0);
        assert_eq!(values[14], 13.0);
    }

    #[test]
    fn test_rows_must_continue_history() {
        let h = history(30, 10.0);
        let stale = rows(&history(20, 10.0), 3);
        let registry = registry_with(|_| Ok(5.0));

        for mode in [LagMode::Seeded, LagMode::Iterative] {
            let outcome = ForecastEngine::new(&registry, mode).forecast_demand(&h, &stale);
            assert_eq!(outcome.value, vec![0.0; 3]);
            match outcome.diagnostic {
                Some(Diagnostic::PredictionUnavailable { reason, .. }) => {
                    assert!(reason.contains("2024-01-21"), "{}", reason);
                    assert!(reason.contains("2024-01-30"), "{}", reason);
                }
                other => panic!("unexpected diagnostic {:?}", other),
            }
        }

        // aligned rows still forecast
        let aligned = rows(&h, 3);
        let outcome = ForecastEngine::new(&registry, LagMode::Seeded).forecast_demand(&h, &aligned);
        assert_eq!(outcome.value, vec![5.0; 3]);
    }

    proptest! {
        #[test]
        fn prop_forecast_length_and_non_negative(
            horizon in 1usize..60,
            offset in -100.0..100.0f64,
            iterative in any::<bool>(),
        ) {
            let h = history(40, 7.0);
            let r = rows(&h, horizon);
            let registry =
                registry_with(move |f| Ok(f.get("day_of_week").unwrap_or(0.0) * 10.0 + offset));
            let mode = if iterative { LagMode::Iterative } else { LagMode::Seeded };
            let outcome = ForecastEngine::new(&registry, mode).forecast_demand(&h, &r);

            prop_assert_eq!(outcome.value.len(), horizon);
            prop_assert!(outcome.value.iter().all(|v| *v >= 0.0));
            prop_assert!(!outcome.is_degraded());
        }
    }
}
