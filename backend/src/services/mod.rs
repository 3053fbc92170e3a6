//! Service layer for the decision core.
//!
//! Each service is a pure, request-scoped computation over its inputs. The
//! engines read predictors from a [`ModelRegistry`](crate::predictors::ModelRegistry)
//! passed by reference and never hold state between calls.

pub mod evaluation;
pub mod forecast;
pub mod pipeline;
pub mod risk;
pub mod safe_window;
pub mod scenario;

#[cfg(test)]
mod forecast_tests;
#[cfg(test)]
mod safe_window_tests;

pub use evaluation::{backtest, best_model, Backtest, BestModel, ForecastAccuracy, ModelScore};
pub use forecast::{forecast_demand, ForecastEngine};
pub use pipeline::{
    AnalysisOptions, AnalysisReport, AnalysisSummary, DecisionPipeline, ScenarioReport,
};
pub use risk::{forecast_risk, RiskEngine, FALLBACK_RISK};
pub use safe_window::find_longest_safe_window;
pub use scenario::{
    apply_scenario, find_scenario, get_available_scenarios, get_scenario_description, recommend,
    scenarios, AdjustedSeries, DemandOutlook, Recommendation, RiskOutlook, Scenario,
    ScenarioImpact, Severity, Tiered, SAFETY_BUFFER,
};
