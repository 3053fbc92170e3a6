//! Feature construction for the forecast horizon.
//!
//! - [`projector`]: history → [`FutureFeatureRow`](crate::models::FutureFeatureRow)s
//! - [`demand`]: calendar, lag, rolling and one-hot features for the demand model
//! - [`risk`]: contextual indicators for the risk model

pub mod demand;
pub mod projector;
pub mod risk;

pub use demand::{
    DemandFeatureBuilder, LagChain, LagMode, UnknownCategory, LAG_OFFSETS, ROLLING_WINDOWS,
};
pub use projector::{project_future, project_future_for, SeriesIdentity};
pub use risk::{risk_feature_names, risk_features};
