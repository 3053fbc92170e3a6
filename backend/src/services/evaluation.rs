//! Forecast accuracy metrics, model comparison and holdout backtesting.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::forecast::ForecastEngine;
use crate::config::EngineConfig;
use crate::error::{CoreError, CoreResult, Diagnostic, ErrorContext};
use crate::features::project_future;
use crate::models::{EventCalendar, EventFlags, HistoricalSeries};
use crate::predictors::ModelRegistry;

/// Error metrics of a forecast against observed values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    pub rmse: f64,
    pub mae: f64,
    /// Mean absolute percentage error over non-zero actuals, in percent.
    pub mape: f64,
    /// Coefficient of determination; 0 when the actuals have no variance.
    pub r2: f64,
    pub samples: usize,
}

impl ForecastAccuracy {
    /// # Errors
    ///
    /// `InvalidInput` when the slices differ in length or are empty.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> CoreResult<Self> {
        let context = || ErrorContext::new("forecast_accuracy");
        if actual.len() != predicted.len() {
            return Err(CoreError::invalid_input_with_context(
                format!(
                    "{} actual values but {} predictions",
                    actual.len(),
                    predicted.len()
                ),
                context(),
            ));
        }
        if actual.is_empty() {
            return Err(CoreError::invalid_input_with_context(
                "no samples to score",
                context(),
            ));
        }

        let n = actual.len() as f64;
        let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();

        let sse: f64 = errors.iter().map(|e| e * e).sum();
        let rmse = (sse / n).sqrt();
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let pct: Vec<f64> = actual
            .iter()
            .zip(&errors)
            .filter(|(a, _)| **a != 0.0)
            .map(|(a, e)| (e / a).abs())
            .collect();
        let mape = if pct.is_empty() {
            0.0
        } else {
            pct.iter().sum::<f64>() / pct.len() as f64 * 100.0
        };

        let mean_actual = actual.iter().sum::<f64>() / n;
        let sst: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
        let r2 = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };

        Ok(Self {
            rmse,
            mae,
            mape,
            r2,
            samples: actual.len(),
        })
    }
}

/// One candidate in a model comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub name: String,
    pub available: bool,
    pub accuracy: Option<ForecastAccuracy>,
}

/// The winner of a model comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModel {
    pub name: String,
    pub rmse: f64,
    pub reason: String,
}

/// Pick the available model with the lowest RMSE.
///
/// Models without accuracy or with a NaN RMSE are skipped; ties keep the
/// first candidate.
pub fn best_model(scores: &[ModelScore]) -> Option<BestModel> {
    let winner = scores
        .iter()
        .filter(|s| s.available)
        .filter_map(|s| s.accuracy.map(|a| (s, a.rmse)))
        .filter(|(_, rmse)| !rmse.is_nan())
        .fold(None::<(&ModelScore, f64)>, |best, (s, rmse)| match best {
            Some((_, best_rmse)) if best_rmse <= rmse => best,
            _ => Some((s, rmse)),
        })?;

    let (score, rmse) = winner;
    Some(BestModel {
        name: score.name.clone(),
        rmse,
        reason: format!("Lowest RMSE ({:.2}) among available models", rmse),
    })
}

/// Result of forecasting a held-out suffix of history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backtest {
    pub holdout_days: usize,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
    pub accuracy: ForecastAccuracy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

/// Hold out the last `holdout_days` observations, forecast them from the
/// remainder and score the forecast.
///
/// Held-out holiday and promotion flags are known and feed the projection.
/// Only held-out days with an observed `units_sold` are scored.
///
/// # Errors
///
/// `InsufficientHistory` when `holdout_days` is 0, is not smaller than the
/// history, or leaves no observed day to score.
pub fn backtest(
    history: &HistoricalSeries,
    holdout_days: usize,
    registry: &ModelRegistry,
    config: &EngineConfig,
) -> CoreResult<Backtest> {
    let (train, held_out) = history
        .split_holdout(holdout_days)
        .map_err(|e| e.with_operation("backtest"))?;

    let mut calendar = EventCalendar::new();
    for p in held_out {
        calendar.insert(
            p.date,
            EventFlags {
                holiday: p.holiday_flag,
                promotion: p.promotion_flag,
            },
        );
    }

    let rows = project_future(&train, holdout_days, &config.projection, Some(&calendar))?;
    let forecast = ForecastEngine::new(registry, config.forecast.lag_mode)
        .forecast_demand(&train, &rows);
    let (predictions, diagnostic) = forecast.into_parts();

    let by_date: HashMap<_, _> = rows
        .iter()
        .map(|r| r.date)
        .zip(predictions.iter().copied())
        .collect();

    let (actual, predicted): (Vec<f64>, Vec<f64>) = held_out
        .iter()
        .filter_map(|p| {
            let units = p.units_sold.filter(|v| v.is_finite())?;
            by_date.get(&p.date).map(|pred| (units, *pred))
        })
        .unzip();

    if actual.is_empty() {
        return Err(CoreError::insufficient_history_with_context(
            "no observed units in the held-out days",
            ErrorContext::new("backtest").with_entity("history"),
        ));
    }

    let accuracy = ForecastAccuracy::compute(&actual, &predicted)?;
    debug!(
        "Backtest over {} days: rmse={:.3} mae={:.3}",
        accuracy.samples, accuracy.rmse, accuracy.mae
    );

    Ok(Backtest {
        holdout_days,
        actual,
        predicted,
        accuracy,
        diagnostic,
    })
}
