//! Demand forecasting over projected rows.
//!
//! The engine never fails because of model state: a missing predictor, a
//! predictor error, malformed output or an out-of-vocabulary category all
//! produce an all-zero series of the right length plus a [`Diagnostic`].

use log::{debug, warn};

use crate::error::{Diagnostic, ModelKind, Outcome};
use crate::features::{DemandFeatureBuilder, LagChain, LagMode};
use crate::models::{FutureFeatureRow, HistoricalSeries};
use crate::predictors::{DemandModel, ModelRegistry};

/// Demand forecaster bound to a registry and lag mode.
#[derive(Debug, Clone, Copy)]
pub struct ForecastEngine<'a> {
    registry: &'a ModelRegistry,
    lag_mode: LagMode,
}

impl<'a> ForecastEngine<'a> {
    pub fn new(registry: &'a ModelRegistry, lag_mode: LagMode) -> Self {
        Self { registry, lag_mode }
    }

    pub fn lag_mode(&self) -> LagMode {
        self.lag_mode
    }

    /// Forecast demand for `rows`, reading lag context from `history`.
    pub fn forecast_demand(
        &self,
        history: &HistoricalSeries,
        rows: &[FutureFeatureRow],
    ) -> Outcome<Vec<f64>> {
        forecast_demand(history, rows, self.registry.demand(), self.lag_mode)
    }
}

/// Forecast demand for `rows` with an optional model.
///
/// Output has one non-negative value per row, in row order.
///
/// Lag features chain `history` straight into `rows`, so the first row must
/// fall on the day after the last observation, as [`project_future`] produces.
/// Rows that do not continue `history` yield zeros and a
/// `PredictionUnavailable` diagnostic.
///
/// [`project_future`]: crate::features::project_future
pub fn forecast_demand(
    history: &HistoricalSeries,
    rows: &[FutureFeatureRow],
    model: Option<&DemandModel>,
    lag_mode: LagMode,
) -> Outcome<Vec<f64>> {
    let Some(model) = model else {
        warn!(
            "Demand model not loaded; returning zero forecast for {} rows",
            rows.len()
        );
        return Outcome::degraded(
            vec![0.0; rows.len()],
            Diagnostic::ModelNotLoaded {
                model: ModelKind::Demand,
            },
        );
    };

    let result = check_alignment(history, rows).and_then(|()| match lag_mode {
        LagMode::Seeded => predict_seeded(history, rows, model),
        LagMode::Iterative => predict_iterative(history, rows, model),
    });

    match result {
        Ok(values) => {
            debug!(
                "Forecast {} rows with {} ({:?} lags)",
                values.len(),
                model.predictor.name(),
                lag_mode
            );
            Outcome::ok(values)
        }
        Err(reason) => {
            warn!("Demand prediction unavailable: {}", reason);
            Outcome::degraded(
                vec![0.0; rows.len()],
                Diagnostic::prediction_unavailable(ModelKind::Demand, reason),
            )
        }
    }
}

/// Rows must start the day after the last observation. An empty history has
/// no lags to misalign.
fn check_alignment(history: &HistoricalSeries, rows: &[FutureFeatureRow]) -> Result<(), String> {
    let (Some(last), Some(first)) = (history.last_date(), rows.first()) else {
        return Ok(());
    };
    if last.succ_opt() == Some(first.date) {
        Ok(())
    } else {
        Err(format!("rows start on {} but history ends on {}", first.date, last))
    }
}

fn predict_seeded(
    history: &HistoricalSeries,
    rows: &[FutureFeatureRow],
    model: &DemandModel,
) -> Result<Vec<f64>, String> {
    let builder = DemandFeatureBuilder::new(&model.vocabulary);
    let chain = LagChain::new(history, rows);

    let vectors = rows
        .iter()
        .enumerate()
        .map(|(i, row)| builder.build(row, i, &chain))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    let raw = model
        .predictor
        .predict_batch(&vectors)
        .map_err(|e| e.to_string())?;

    if raw.len() != rows.len() {
        return Err(format!(
            "model returned {} values for {} rows",
            raw.len(),
            rows.len()
        ));
    }

    raw.into_iter().map(clamp_demand).collect()
}

fn predict_iterative(
    history: &HistoricalSeries,
    rows: &[FutureFeatureRow],
    model: &DemandModel,
) -> Result<Vec<f64>, String> {
    let builder = DemandFeatureBuilder::new(&model.vocabulary);
    let mut chain = LagChain::new(history, rows);
    let mut out = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let features = builder.build(row, i, &chain).map_err(|e| e.to_string())?;
        let raw = model
            .predictor
            .predict(&features)
            .map_err(|e| e.to_string())?;
        let value = clamp_demand(raw)?;
        chain.set_future(i, value);
        out.push(value);
    }

    Ok(out)
}

fn clamp_demand(raw: f64) -> Result<f64, String> {
    if raw.is_nan() {
        return Err("model returned NaN".to_string());
    }
    if raw.is_infinite() {
        return Err("model returned a non-finite value".to_string());
    }
    Ok(raw.max(0.0))
}
