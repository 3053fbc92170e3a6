//! HTTP server module for the decision core.
//!
//! This module provides an axum-based HTTP server that exposes the decision
//! core as a REST API. Handlers parse requests into core types, run the
//! computation on the blocking pool and serialize the result.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing and validation                         │
//! │  - JSON serialization/deserialization                     │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                                │
//! │  - Projection, forecasts, safe window                     │
//! │  - Scenarios and recommendations                          │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  ModelRegistry (predictors.rs)                            │
//! │  - Optional demand / risk predictor handles               │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
