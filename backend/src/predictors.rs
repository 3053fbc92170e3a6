//! Predictor handles consumed by the engines.
//!
//! Trained models are opaque to this crate. A host wraps each model in a
//! [`DemandPredictor`] or [`RiskPredictor`] and registers it in a
//! [`ModelRegistry`], which is then passed by reference into every analysis.
//! A registry slot left empty means "model not loaded".

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::models::FeatureVector;

/// Failure reported by a predictor implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictorError {
    /// The model raised while scoring.
    #[error("model failure: {0}")]
    Failed(String),
    /// The model returned something that does not match the expected shape.
    #[error("malformed model output: {0}")]
    Malformed(String),
}

/// Output of a risk model.
///
/// Classifiers report a probability pair `[negative, positive]`; regressors
/// report a raw score.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskOutput {
    Score(f64),
    Probabilities(Vec<f64>),
}

/// Interface for demand regression models.
pub trait DemandPredictor: Send + Sync {
    /// Predict units sold for one feature row.
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError>;

    /// Predict a batch of rows.
    ///
    /// Override when the model scores batches natively; the default scores
    /// rows one at a time.
    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, PredictorError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Get model name/type
    fn name(&self) -> &str {
        "demand-model"
    }
}

/// Interface for disruption risk models.
pub trait RiskPredictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<RiskOutput, PredictorError>;

    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<RiskOutput>, PredictorError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    fn name(&self) -> &str {
        "risk-model"
    }
}

/// Adapter turning a closure into a predictor.
///
/// ```
/// use retail_decision::predictors::{DemandPredictor, PredictorFn};
/// use retail_decision::models::FeatureVector;
///
/// let model = PredictorFn::new("constant", |_: &FeatureVector| Ok(12.0));
/// assert_eq!(DemandPredictor::name(&model), "constant");
/// ```
pub struct PredictorFn<F> {
    name: String,
    f: F,
}

impl<F> PredictorFn<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> DemandPredictor for PredictorFn<F>
where
    F: Fn(&FeatureVector) -> Result<f64, PredictorError> + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError> {
        (self.f)(features)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> RiskPredictor for PredictorFn<F>
where
    F: Fn(&FeatureVector) -> Result<RiskOutput, PredictorError> + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> Result<RiskOutput, PredictorError> {
        (self.f)(features)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fixed category vocabulary agreed with the trained demand model.
///
/// The one-hot columns emitted for products and locations follow the order
/// given here, so it must match the order used at training time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    version: String,
    products: Vec<String>,
    locations: Vec<String>,
}

impl CategoryVocabulary {
    /// Duplicate entries are dropped, keeping the first occurrence.
    pub fn new(version: impl Into<String>, products: Vec<String>, locations: Vec<String>) -> Self {
        Self {
            version: version.into(),
            products: dedup_in_order(products),
            locations: dedup_in_order(locations),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn contains_product(&self, product: &str) -> bool {
        self.products.iter().any(|p| p == product)
    }

    pub fn contains_location(&self, location: &str) -> bool {
        self.locations.iter().any(|l| l == location)
    }
}

fn dedup_in_order(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Demand model together with the vocabulary it was trained on.
#[derive(Clone)]
pub struct DemandModel {
    pub predictor: Arc<dyn DemandPredictor>,
    pub vocabulary: CategoryVocabulary,
}

/// Explicit holder for the optional predictor handles.
///
/// Created once by the host and shared by reference; the engines never reach
/// for global state.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    demand: Option<DemandModel>,
    risk: Option<Arc<dyn RiskPredictor>>,
}

/// Which predictors are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub demand_loaded: bool,
    pub risk_loaded: bool,
}

/// Descriptive entry for a registry slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub key: String,
    pub name: String,
    pub description: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_version: Option<String>,
}

impl ModelRegistry {
    /// A registry with no models loaded.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_demand_model(
        mut self,
        predictor: Arc<dyn DemandPredictor>,
        vocabulary: CategoryVocabulary,
    ) -> Self {
        self.demand = Some(DemandModel {
            predictor,
            vocabulary,
        });
        self
    }

    pub fn with_risk_model(mut self, predictor: Arc<dyn RiskPredictor>) -> Self {
        self.risk = Some(predictor);
        self
    }

    pub fn demand(&self) -> Option<&DemandModel> {
        self.demand.as_ref()
    }

    pub fn risk(&self) -> Option<&Arc<dyn RiskPredictor>> {
        self.risk.as_ref()
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            demand_loaded: self.demand.is_some(),
            risk_loaded: self.risk.is_some(),
        }
    }

    /// Availability and descriptions of every registry slot.
    pub fn model_info(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                key: "demand".to_string(),
                name: self
                    .demand
                    .as_ref()
                    .map(|m| m.predictor.name().to_string())
                    .unwrap_or_else(|| "Demand Forecaster".to_string()),
                description: "Regression model for daily units sold".to_string(),
                available: self.demand.is_some(),
                vocabulary_version: self
                    .demand
                    .as_ref()
                    .map(|m| m.vocabulary.version().to_string()),
            },
            ModelInfo {
                key: "risk".to_string(),
                name: self
                    .risk
                    .as_ref()
                    .map(|m| m.name().to_string())
                    .unwrap_or_else(|| "Risk Classifier".to_string()),
                description: "Classification model for supply disruption risk".to_string(),
                available: self.risk.is_some(),
                vocabulary_version: None,
            },
        ]
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("demand", &self.demand.as_ref().map(|m| m.predictor.name()))
            .field("risk", &self.risk.as_ref().map(|m| m.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_status() {
        let registry = ModelRegistry::new();
        assert_eq!(
            registry.status(),
            ModelStatus {
                demand_loaded: false,
                risk_loaded: false
            }
        );
        let info = registry.model_info();
        assert_eq!(info.len(), 2);
        assert!(info.iter().all(|m| !m.available));
    }

    #[test]
    fn test_registered_models_are_reported() {
        let vocab = CategoryVocabulary::new("v2", vec!["Chairs".into()], vec!["Austin".into()]);
        let registry = ModelRegistry::new()
            .with_demand_model(
                Arc::new(PredictorFn::new("xgb", |_: &FeatureVector| Ok(1.0))),
                vocab,
            )
            .with_risk_model(Arc::new(PredictorFn::new("rf", |_: &FeatureVector| {
                Ok(RiskOutput::Score(0.1))
            })));

        assert!(registry.status().demand_loaded);
        assert!(registry.status().risk_loaded);

        let info = registry.model_info();
        assert_eq!(info[0].name, "xgb");
        assert_eq!(info[0].vocabulary_version.as_deref(), Some("v2"));
        assert_eq!(info[1].name, "rf");
        assert!(format!("{:?}", registry).contains("xgb"));
    }

    #[test]
    fn test_vocabulary_dedups_in_order() {
        let vocab = CategoryVocabulary::new(
            "v1",
            vec!["B".into(), "A".into(), "B".into()],
            vec![],
        );
        assert_eq!(vocab.products(), &["B".to_string(), "A".to_string()]);
        assert!(vocab.contains_product("A"));
        assert!(!vocab.contains_location("A"));
    }

    #[test]
    fn test_default_batch_scores_each_row() {
        let names: Arc<[String]> = vec!["x".to_string()].into();
        let rows: Vec<FeatureVector> = (0..3)
            .map(|i| FeatureVector::new(names.clone(), vec![i as f64]).unwrap())
            .collect();
        let model = PredictorFn::new("double", |f: &FeatureVector| Ok(f.values()[0] * 2.0));
        let out = DemandPredictor::predict_batch(&model, &rows).unwrap();
        assert_eq!(out, vec![0.0, 2.0, 4.0]);
    }
}
