//! Error types for simlab.
//!
//! The integrators never fail: degenerate input is clamped into a usable
//! state. Errors only surface at the outer layers (YAML loading, CLI,
//! snapshot export, scheduler bookkeeping).

use thiserror::Error;

/// Result type alias for simlab operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all simlab operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Numerical Guards =====
    /// Non-finite value (NaN or Inf) detected in experiment state.
    #[error("Jidoka: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Configuration kind does not match the experiment it was sent to.
    #[error("Experiment kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        /// Kind of the running experiment.
        expected: String,
        /// Kind carried by the rejected configuration.
        actual: String,
    },

    /// Unknown experiment or preset name.
    #[error("Unknown experiment: {0}")]
    UnknownExperiment(String),

    /// Scheduler registration not found (already unregistered).
    #[error("No experiment registered under id {0}")]
    UnknownRegistration(u64),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error came from a numerical guard rather than input.
    #[must_use]
    pub const fn is_numerical_fault(&self) -> bool {
        matches!(self, Self::NonFiniteValue { .. })
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
