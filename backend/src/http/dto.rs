//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies are deserialized here and converted into the core's typed
//! inputs by the handlers. Most response payloads embed core types directly
//! since they already derive Serialize.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use crate::api::{AdjustedSeries, AnalysisReport, Diagnostic, Recommendation, SafeWindow};
pub use crate::api::{EventCalendar, ScenarioImpact, ScenarioReport, TimePoint};
pub use crate::predictors::{ModelInfo, ModelStatus};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Which predictors are registered
    pub models: ModelStatus,
}

/// Model registry listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub status: ModelStatus,
}

/// Scenario entry for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDto {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Scenario list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioListResponse {
    pub scenarios: Vec<ScenarioDto>,
    pub total: usize,
}

/// Scenario to replay on top of an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSelection {
    pub id: String,
    #[serde(default = "default_severity")]
    pub severity: String,
}

fn default_severity() -> String {
    "medium".to_string()
}

/// Request body for `POST /v1/analysis`.
///
/// `history` may mix pairs when `product` and `location` are both given;
/// otherwise it must already be a single sorted series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub history: Vec<TimePoint>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub horizon_days: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub calendar: Option<EventCalendar>,
    #[serde(default)]
    pub scenario: Option<ScenarioSelection>,
}

/// Response for `POST /v1/analysis`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioReport>,
}

/// Request body for `POST /v1/scenarios/apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioApplyRequest {
    pub dates: Vec<NaiveDate>,
    pub demand: Vec<f64>,
    pub risk: Vec<f64>,
    pub scenario_id: String,
    pub severity: String,
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Response for `POST /v1/scenarios/apply`.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioApplyResponse {
    pub adjusted: AdjustedSeries,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<ScenarioImpact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

/// Request body for `POST /v1/safe-window`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeWindowRequest {
    pub dates: Vec<NaiveDate>,
    pub risk: Vec<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Response for `POST /v1/safe-window`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeWindowResponse {
    pub threshold: f64,
    pub window: Option<SafeWindow>,
}
