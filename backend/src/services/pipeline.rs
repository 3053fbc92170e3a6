//! End-to-end analysis: projection, forecasts, safe window and scenarios.

use log::{debug, info};
use serde::Serialize;

use super::forecast::ForecastEngine;
use super::risk::RiskEngine;
use super::safe_window::find_longest_safe_window;
use super::scenario::{
    apply_scenario, get_scenario_description, recommend, Recommendation, ScenarioImpact,
};
use crate::config::EngineConfig;
use crate::error::{CoreError, CoreResult, Diagnostic, ErrorContext};
use crate::features::project_future;
use crate::models::{EventCalendar, HistoricalSeries, PredictionSeries, RiskLevel, SafeWindow};
use crate::predictors::ModelRegistry;

/// Per-request overrides of the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub horizon_days: Option<usize>,
    pub threshold: Option<f64>,
    pub calendar: Option<EventCalendar>,
}

/// Aggregate figures over the forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub total_demand: f64,
    pub mean_demand: f64,
    pub mean_risk: f64,
    pub peak_risk: f64,
    pub risk_level: RiskLevel,
    /// Days with risk strictly below the threshold, contiguous or not.
    pub safe_days: usize,
}

impl AnalysisSummary {
    fn from_series(series: &PredictionSeries, threshold: f64) -> Self {
        let mean_risk = series.mean_risk();
        Self {
            total_demand: series.demand().iter().sum(),
            mean_demand: series.mean_demand(),
            mean_risk,
            peak_risk: series.peak_risk(),
            risk_level: RiskLevel::from_probability(mean_risk),
            safe_days: series.risk().iter().filter(|r| **r < threshold).count(),
        }
    }
}

/// Baseline analysis of one (product, location) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub product: String,
    pub location: String,
    pub history_checksum: String,
    pub threshold: f64,
    pub predictions: PredictionSeries,
    pub window: Option<SafeWindow>,
    pub summary: AnalysisSummary,
    pub diagnostics: Vec<Diagnostic>,
}

/// A scenario applied on top of a baseline report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub severity: String,
    pub adjusted: PredictionSeries,
    pub window: Option<SafeWindow>,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<ScenarioImpact>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the decision core against a registry and configuration.
///
/// Holds only shared references, so one pipeline can serve many requests and
/// independent analyses may run on separate threads.
#[derive(Debug, Clone, Copy)]
pub struct DecisionPipeline<'a> {
    registry: &'a ModelRegistry,
    config: &'a EngineConfig,
}

impl<'a> DecisionPipeline<'a> {
    pub fn new(registry: &'a ModelRegistry, config: &'a EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Project, forecast demand and risk, and search the safe window.
    pub fn analyze(
        &self,
        history: &HistoricalSeries,
        options: &AnalysisOptions,
    ) -> CoreResult<AnalysisReport> {
        let horizon = options
            .horizon_days
            .unwrap_or(self.config.analysis.default_horizon_days);
        let threshold = options
            .threshold
            .unwrap_or(self.config.analysis.default_threshold);

        let rows = project_future(
            history,
            horizon,
            &self.config.projection,
            options.calendar.as_ref(),
        )?;

        let demand = ForecastEngine::new(self.registry, self.config.forecast.lag_mode)
            .forecast_demand(history, &rows);
        let risk = RiskEngine::new(self.registry).forecast_risk(&rows);

        let mut diagnostics = Vec::new();
        let (demand, d) = demand.into_parts();
        diagnostics.extend(d);
        let (risk, d) = risk.into_parts();
        diagnostics.extend(d);

        let dates = rows.iter().map(|r| r.date).collect();
        let predictions = PredictionSeries::new(dates, demand, risk)?;
        let window = find_longest_safe_window(predictions.dates(), predictions.risk(), threshold)?;
        let summary = AnalysisSummary::from_series(&predictions, threshold);

        // project_future rejects empty history, so the identity is present
        let (product, location) = match (history.product(), history.location()) {
            (Some(p), Some(l)) => (p.to_string(), l.to_string()),
            _ => {
                return Err(CoreError::insufficient_history_with_context(
                    "history is empty",
                    ErrorContext::new("analyze").with_entity("history"),
                ))
            }
        };

        info!(
            "Analyzed ({}, {}) over {} days: mean demand {:.1}, mean risk {:.3}, window {}",
            product,
            location,
            predictions.len(),
            summary.mean_demand,
            summary.mean_risk,
            window
                .map(|w| format!("{} days from {}", w.length_days, w.start_date))
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(AnalysisReport {
            product,
            location,
            history_checksum: history.checksum(),
            threshold,
            predictions,
            window,
            summary,
            diagnostics,
        })
    }

    /// Apply a scenario to a baseline report and recommend a plan.
    ///
    /// The report's threshold is reused unless `threshold` overrides it.
    /// Baseline diagnostics are carried forward.
    pub fn run_scenario(
        &self,
        report: &AnalysisReport,
        scenario_id: &str,
        severity: &str,
        threshold: Option<f64>,
    ) -> CoreResult<ScenarioReport> {
        let threshold = threshold.unwrap_or(report.threshold);
        let baseline = &report.predictions;

        let (adjusted, diagnostic) =
            apply_scenario(baseline.demand(), baseline.risk(), scenario_id, severity)?.into_parts();
        let adjusted =
            PredictionSeries::new(baseline.dates().to_vec(), adjusted.demand, adjusted.risk)?;

        let recommendation = recommend(
            adjusted.demand(),
            adjusted.risk(),
            adjusted.dates(),
            threshold,
        )?;
        let window = recommendation.window().copied();

        let mut diagnostics = report.diagnostics.clone();
        diagnostics.extend(diagnostic);

        debug!(
            "Scenario {}/{} on ({}, {}): window {:?}",
            scenario_id, severity, report.product, report.location, window
        );

        Ok(ScenarioReport {
            scenario: scenario_id.to_string(),
            severity: severity.to_string(),
            adjusted,
            window,
            recommendation,
            impact: get_scenario_description(scenario_id, severity).ok(),
            diagnostics,
        })
    }
}
