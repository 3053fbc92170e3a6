//! Domain models shared by every stage of the decision pipeline.
//!
//! - [`series`]: observed history ([`TimePoint`], [`HistoricalSeries`])
//! - [`prediction`]: projected rows, prediction series and safe windows
//! - [`calendar`]: holiday / promotion overrides for future dates
//! - [`features`]: named feature vectors handed to predictors

pub mod calendar;
pub mod checksum;
pub mod features;
pub mod prediction;
pub mod series;

pub use calendar::{EventCalendar, EventFlags};
pub use checksum::calculate_checksum;
pub use features::FeatureVector;
pub use prediction::{FutureFeatureRow, PredictionRow, PredictionSeries, RiskLevel, SafeWindow};
pub use series::{distinct_locations, distinct_products, HistoricalSeries, TimePoint};
