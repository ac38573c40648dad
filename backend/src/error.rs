//! Error types for the planner.
//!
//! Adapter failures surface as [`EphemerisError`] and are absorbed at each
//! locator boundary and never reach a caller. [`PlannerError`] is what does:
//! rejected input and configuration, plus internal faults such as a planning
//! task that panicked.

use std::fmt;

/// Result type for planner operations.
pub type PlannerResult<T> = Result<T, PlannerError>;

/// Structured context attached to a [`PlannerError`].
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "locate_core", "load_config")
    pub operation: Option<String>,
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
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if parts.is_empty() {
            return Ok(());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Failure reported by an ephemeris, lunar or timezone adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EphemerisError {
    /// An input (time, coordinate) was NaN or infinite.
    #[error("non-finite input: {0}")]
    NonFiniteInput(&'static str),

    /// The computation produced a value outside its physical range.
    #[error("invalid result: {0}")]
    InvalidResult(String),

    /// The adapter could not serve the request.
    #[error("ephemeris unavailable: {0}")]
    Unavailable(String),
}

/// Error type for planner operations.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// Latitude or longitude outside the valid range.
    #[error("Invalid location: {message} {context}")]
    InvalidLocation {
        message: String,
        context: ErrorContext,
    },

    /// A date could not be parsed or lies outside the supported range.
    #[error("Invalid date: {message} {context}")]
    InvalidDate {
        message: String,
        context: ErrorContext,
    },

    /// Configuration could not be read, parsed, or validated.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl PlannerError {
    /// Create an invalid location error.
    pub fn invalid_location(message: impl Into<String>) -> Self {
        Self::InvalidLocation {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an invalid date error.
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error with context.
    pub fn configuration_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Configuration {
            message: message.into(),
            context,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an internal error with context.
    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Internal {
            message: message.into(),
            context,
        }
    }

    /// True when the error was caused by caller input rather than the planner.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidLocation { .. } | Self::InvalidDate { .. }
        )
    }
}
