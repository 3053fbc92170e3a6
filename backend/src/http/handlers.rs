//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for the computation.

use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::{
    AnalysisRequest, AnalysisResponse, HealthResponse, ModelsResponse, ScenarioApplyRequest,
    ScenarioApplyResponse, ScenarioDto, ScenarioImpact, ScenarioListResponse, SafeWindowRequest,
    SafeWindowResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::HistoricalSeries;
use crate::services::pipeline::{AnalysisOptions, DecisionPipeline};
use crate::services::safe_window::find_longest_safe_window;
use crate::services::scenario::{apply_scenario, get_scenario_description, recommend, scenarios};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Run CPU-bound work on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint reporting which predictors are loaded.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        models: state.registry.status(),
    }))
}

/// GET /v1/models
pub async fn list_models(State(state): State<AppState>) -> HandlerResult<ModelsResponse> {
    Ok(Json(ModelsResponse {
        models: state.registry.model_info(),
        status: state.registry.status(),
    }))
}

// =============================================================================
// Scenarios
// =============================================================================

/// GET /v1/scenarios
pub async fn list_scenarios() -> HandlerResult<ScenarioListResponse> {
    let scenarios: Vec<ScenarioDto> = scenarios()
        .iter()
        .map(|s| ScenarioDto {
            id: s.id.to_string(),
            name: s.name.to_string(),
            description: s.description.to_string(),
        })
        .collect();
    let total = scenarios.len();

    Ok(Json(ScenarioListResponse { scenarios, total }))
}

/// GET /v1/scenarios/{scenario_id}/{severity}
///
/// Describe the impact of a scenario at a severity tier. Unknown ids or tiers
/// are reported as 404.
pub async fn describe_scenario(
    Path((scenario_id, severity)): Path<(String, String)>,
) -> HandlerResult<ScenarioImpact> {
    get_scenario_description(&scenario_id, &severity)
        .map(Json)
        .map_err(AppError::UnknownScenario)
}

/// POST /v1/scenarios/apply
///
/// Apply a scenario to caller-supplied series and recommend a plan. An
/// unknown scenario is not an error here: the series come back unchanged
/// with a diagnostic.
pub async fn apply_scenario_handler(
    State(state): State<AppState>,
    Json(request): Json<ScenarioApplyRequest>,
) -> HandlerResult<ScenarioApplyResponse> {
    let threshold = request
        .threshold
        .unwrap_or(state.config.analysis.default_threshold);

    let response = blocking(move || {
        let (adjusted, diagnostic) = apply_scenario(
            &request.demand,
            &request.risk,
            &request.scenario_id,
            &request.severity,
        )?
        .into_parts();
        let recommendation =
            recommend(&adjusted.demand, &adjusted.risk, &request.dates, threshold)?;

        Ok(ScenarioApplyResponse {
            impact: get_scenario_description(&request.scenario_id, &request.severity).ok(),
            adjusted,
            recommendation,
            diagnostic,
        })
    })
    .await?;

    Ok(Json(response))
}

// =============================================================================
// Analysis
// =============================================================================

/// POST /v1/analysis
///
/// Run the full pipeline over the supplied history, optionally replaying a
/// scenario on the result.
pub async fn run_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> HandlerResult<AnalysisResponse> {
    let history = match (&request.product, &request.location) {
        (Some(product), Some(location)) => {
            HistoricalSeries::select(&request.history, product, location)?
        }
        (None, None) => HistoricalSeries::new(request.history)?,
        _ => {
            return Err(AppError::BadRequest(
                "product and location must be given together".to_string(),
            ))
        }
    };

    let options = AnalysisOptions {
        horizon_days: request.horizon_days,
        threshold: request.threshold,
        calendar: request.calendar,
    };
    let scenario = request.scenario;

    let response = blocking(move || {
        let pipeline = DecisionPipeline::new(&state.registry, &state.config);
        let report = pipeline.analyze(&history, &options)?;
        let scenario = scenario
            .map(|s| pipeline.run_scenario(&report, &s.id, &s.severity, None))
            .transpose()?;
        Ok(AnalysisResponse { report, scenario })
    })
    .await?;

    Ok(Json(response))
}

// =============================================================================
// Safe Window
// =============================================================================

/// POST /v1/safe-window
pub async fn safe_window(
    State(state): State<AppState>,
    Json(request): Json<SafeWindowRequest>,
) -> HandlerResult<SafeWindowResponse> {
    let threshold = request
        .threshold
        .unwrap_or(state.config.analysis.default_threshold);
    let window = find_longest_safe_window(&request.dates, &request.risk, threshold)?;

    Ok(Json(SafeWindowResponse { threshold, window }))
}

/// Fallback for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("No such endpoint".to_string())
}
