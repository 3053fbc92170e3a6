//! Error and diagnostic types for the decision core.
//!
//! Two kinds of trouble are kept apart here:
//!
//! - [`CoreError`]: malformed caller input or unrecoverable setup problems.
//!   Operations that hit one return `Err` immediately.
//! - [`Diagnostic`]: model-state problems (missing model, broken model,
//!   unknown scenario). These never abort an operation; the operation returns a
//!   structurally valid fallback wrapped in an [`Outcome`] together with the
//!   diagnostic so callers can tell a real prediction from a placeholder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Structured context for core errors.
///
/// Provides additional information about where and why an error occurred.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "project_future", "find_longest_safe_window")
    pub operation: Option<String>,
    /// The entity involved (e.g., "history", "risk", "threshold")
    pub entity: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Future-row defaults cannot be built from the supplied history.
    #[error("Insufficient history: {message} {context}")]
    InsufficientHistory {
        message: String,
        context: ErrorContext,
    },

    /// Caller input violates a precondition (bad horizon, mismatched lengths, ...).
    #[error("Invalid input: {message} {context}")]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    /// Configuration could not be read, parsed or validated.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Tabular export failed.
    #[error("Export error: {message} {context}")]
    Export {
        message: String,
        context: ErrorContext,
    },
}

impl CoreError {
    /// Create an insufficient-history error.
    pub fn insufficient_history(message: impl Into<String>) -> Self {
        Self::InsufficientHistory {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an insufficient-history error with context.
    pub fn insufficient_history_with_context(
        message: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        Self::InsufficientHistory {
            message: message.into(),
            context,
        }
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an invalid-input error with context.
    pub fn invalid_input_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InvalidInput {
            message: message.into(),
            context,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an export error.
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::InsufficientHistory { context, .. } => context,
            Self::InvalidInput { context, .. } => context,
            Self::Configuration { context, .. } => context,
            Self::Export { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::InsufficientHistory { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::Configuration { context, .. }
            | Self::Export { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }

    /// `true` for precondition violations caused by the caller.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::export(err.to_string())
    }
}

/// Which predictor a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Demand,
    Risk,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Demand => write!(f, "demand"),
            ModelKind::Risk => write!(f, "risk"),
        }
    }
}

/// Recoverable condition reported next to a fallback result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No predictor handle was registered for this model.
    ModelNotLoaded { model: ModelKind },
    /// The predictor was invoked but failed or produced a malformed result.
    PredictionUnavailable { model: ModelKind, reason: String },
    /// The scenario id or severity tier is not in the registry.
    UnknownScenario { scenario_id: String, severity: String },
}

impl Diagnostic {
    pub fn prediction_unavailable(model: ModelKind, reason: impl Into<String>) -> Self {
        Diagnostic::PredictionUnavailable {
            model,
            reason: reason.into(),
        }
    }

    /// Stable code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::ModelNotLoaded { .. } => "MODEL_NOT_LOADED",
            Diagnostic::PredictionUnavailable { .. } => "PREDICTION_UNAVAILABLE",
            Diagnostic::UnknownScenario { .. } => "UNKNOWN_SCENARIO",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ModelNotLoaded { model } => write!(f, "{} model not loaded", model),
            Diagnostic::PredictionUnavailable { model, reason } => {
                write!(f, "{} prediction unavailable: {}", model, reason)
            }
            Diagnostic::UnknownScenario {
                scenario_id,
                severity,
            } => write!(f, "unknown scenario '{}' at severity '{}'", scenario_id, severity),
        }
    }
}

/// A result value paired with an optional diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub value: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl<T> Outcome<T> {
    /// A clean result.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    /// A fallback result with the reason it was produced.
    pub fn degraded(value: T, diagnostic: Diagnostic) -> Self {
        Self {
            value,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            diagnostic: self.diagnostic,
        }
    }

    pub fn into_parts(self) -> (T, Option<Diagnostic>) {
        (self.value, self.diagnostic)
    }
}
