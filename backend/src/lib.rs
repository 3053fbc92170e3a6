//! # Retail Decision Core
//!
//! Hybrid demand / disruption-risk engine for procurement planning.
//!
//! This crate turns a daily sales history for one (product, location) pair
//! into a demand forecast and a disruption-risk forecast over a horizon,
//! finds the longest safe procurement window, and replays the result under
//! named what-if scenarios. Trained models are consumed as opaque predictors.
//!
//! ## Features
//!
//! - **Projection**: future feature rows from trailing history
//! - **Forecasting**: demand and risk engines with fail-soft fallbacks
//! - **Safe windows**: longest run of days below a risk threshold
//! - **Scenarios**: fixed perturbation registry and recommendations
//! - **Evaluation**: accuracy metrics, model comparison, holdout backtests
//! - **HTTP API**: REST endpoints behind the `http-server` feature
//!
//! ## Architecture
//!
//! - [`models`]: time series, prediction series and windows
//! - [`features`]: feature projection and feature-vector assembly
//! - [`predictors`]: predictor traits and the [`ModelRegistry`](predictors::ModelRegistry)
//! - [`services`]: the engines and the end-to-end pipeline
//! - [`export`]: tabular / CSV output
//! - [`config`]: TOML engine configuration
//! - [`api`]: flat re-exports of the typed operations
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Example
//!
//! ```
//! use chrono::{Days, NaiveDate};
//! use retail_decision::api::*;
//! use retail_decision::config::EngineConfig;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let points = (0..60)
//!     .map(|i| TimePoint::new(start + Days::new(i), "Chairs", "Austin", Some(40.0)))
//!     .collect();
//! let history = HistoricalSeries::new(points).unwrap();
//!
//! let registry = ModelRegistry::new();
//! let config = EngineConfig::default();
//! let report = DecisionPipeline::new(&registry, &config)
//!     .analyze(&history, &AnalysisOptions::default())
//!     .unwrap();
//!
//! assert_eq!(report.predictions.len(), 30);
//! assert_eq!(report.diagnostics.len(), 2);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod models;
pub mod predictors;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
