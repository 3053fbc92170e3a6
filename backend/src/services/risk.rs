//! Disruption risk forecasting over projected rows.

use log::{debug, warn};
use std::sync::Arc;

use crate::error::{Diagnostic, ModelKind, Outcome};
use crate::features::{risk_feature_names, risk_features};
use crate::models::FutureFeatureRow;
use crate::predictors::{ModelRegistry, RiskOutput, RiskPredictor};

/// Placeholder risk reported when no usable prediction exists.
///
/// Equals the default threshold, so fallback days never count as safe there.
pub const FALLBACK_RISK: f64 = 0.3;

/// Risk forecaster bound to a registry.
#[derive(Debug, Clone, Copy)]
pub struct RiskEngine<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> RiskEngine<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    pub fn forecast_risk(&self, rows: &[FutureFeatureRow]) -> Outcome<Vec<f64>> {
        forecast_risk(rows, self.registry.risk())
    }
}

/// Forecast risk for `rows`; every value lies in `[0, 1]`.
pub fn forecast_risk(
    rows: &[FutureFeatureRow],
    model: Option<&Arc<dyn RiskPredictor>>,
) -> Outcome<Vec<f64>> {
    let Some(model) = model else {
        warn!(
            "Risk model not loaded; returning constant {} risk for {} rows",
            FALLBACK_RISK,
            rows.len()
        );
        return Outcome::degraded(
            vec![FALLBACK_RISK; rows.len()],
            Diagnostic::ModelNotLoaded {
                model: ModelKind::Risk,
            },
        );
    };

    match predict(rows, model.as_ref()) {
        Ok(values) => {
            debug!("Scored risk for {} rows with {}", values.len(), model.name());
            Outcome::ok(values)
        }
        Err(reason) => {
            warn!("Risk prediction unavailable: {}", reason);
            Outcome::degraded(
                vec![FALLBACK_RISK; rows.len()],
                Diagnostic::prediction_unavailable(ModelKind::Risk, reason),
            )
        }
    }
}

fn predict(rows: &[FutureFeatureRow], model: &dyn RiskPredictor) -> Result<Vec<f64>, String> {
    let names = risk_feature_names();
    let vectors: Vec<_> = rows.iter().map(|row| risk_features(row, &names)).collect();

    let outputs = model.predict_batch(&vectors).map_err(|e| e.to_string())?;
    if outputs.len() != rows.len() {
        return Err(format!(
            "model returned {} outputs for {} rows",
            outputs.len(),
            rows.len()
        ));
    }

    outputs.iter().map(to_probability).collect()
}

/// Positive-class probability for classifier output, clamped score otherwise.
fn to_probability(output: &RiskOutput) -> Result<f64, String> {
    let value = match output {
        RiskOutput::Score(score) => *score,
        RiskOutput::Probabilities(probs) => match probs.as_slice() {
            [_, positive] => *positive,
            other => {
                return Err(format!(
                    "expected a probability pair, got {} values",
                    other.len()
                ))
            }
        },
    };

    if value.is_nan() {
        return Err("model returned NaN".to_string());
    }
    Ok(value.clamp(0.0, 1.0))
}
