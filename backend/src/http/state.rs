//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::predictors::ModelRegistry;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Predictor handles shared by every request
    pub registry: Arc<ModelRegistry>,
    /// Engine configuration (defaults for horizon, threshold, projection)
    pub config: Arc<EngineConfig>,
}

impl AppState {
    /// Create a new application state with the given registry and config.
    pub fn new(registry: ModelRegistry, config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }
}
