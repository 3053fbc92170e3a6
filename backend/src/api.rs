//! Public API surface of the decision core.
//!
//! This file consolidates the typed operations and the data types they
//! exchange, so hosts can depend on a single flat module.

pub use crate::error::CoreError;
pub use crate::error::CoreResult;
pub use crate::error::Diagnostic;
pub use crate::error::ModelKind;
pub use crate::error::Outcome;
pub use crate::models::EventCalendar;
pub use crate::models::FeatureVector;
pub use crate::models::FutureFeatureRow;
pub use crate::models::HistoricalSeries;
pub use crate::models::PredictionSeries;
pub use crate::models::RiskLevel;
pub use crate::models::SafeWindow;
pub use crate::models::TimePoint;
pub use crate::predictors::CategoryVocabulary;
pub use crate::predictors::DemandPredictor;
pub use crate::predictors::ModelRegistry;
pub use crate::predictors::RiskOutput;
pub use crate::predictors::RiskPredictor;
pub use crate::services::pipeline::AnalysisOptions;
pub use crate::services::pipeline::AnalysisReport;
pub use crate::services::pipeline::DecisionPipeline;
pub use crate::services::pipeline::ScenarioReport;
pub use crate::services::scenario::AdjustedSeries;
pub use crate::services::scenario::Recommendation;
pub use crate::services::scenario::ScenarioImpact;
pub use crate::services::scenario::Severity;

pub use crate::features::project_future;
pub use crate::features::project_future_for;
pub use crate::features::SeriesIdentity;
pub use crate::services::forecast::forecast_demand;
pub use crate::services::risk::forecast_risk;
pub use crate::services::safe_window::find_longest_safe_window;
pub use crate::services::scenario::apply_scenario;
pub use crate::services::scenario::get_available_scenarios;
pub use crate::services::scenario::get_scenario_description;
pub use crate::services::scenario::recommend;
