//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! After every step the guard inspects the experiment. A non-finite value
//! anywhere in its state stops the line: the guard logs a warning and resets
//! the experiment from its current configuration, so an interactive session
//! keeps running instead of drawing NaN.

use serde::{Deserialize, Serialize};

use crate::demos::Experiment;
use crate::error::SimError;

/// Jidoka violation types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaViolation {
    /// Non-finite value (NaN or Inf) detected.
    NonFiniteValue {
        /// Where the value was seen (experiment name and time).
        location: String,
    },
}

impl std::fmt::Display for JidokaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteValue { location } => write!(f, "non-finite state in {location}"),
        }
    }
}

impl From<JidokaViolation> for SimError {
    fn from(v: JidokaViolation) -> Self {
        match v {
            JidokaViolation::NonFiniteValue { location } => Self::NonFiniteValue { location },
        }
    }
}

/// Jidoka guard for one experiment.
///
/// # Example
///
/// ```rust
/// use simlab::demos::{PendulumConfig, PendulumExperiment};
/// use simlab::engine::jidoka::JidokaGuard;
///
/// let mut guard = JidokaGuard::new();
/// let mut experiment = PendulumExperiment::new(PendulumConfig::default());
///
/// // A finite state passes and nothing is reset
/// assert!(!guard.inspect(&mut experiment));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JidokaGuard {
    recoveries: u64,
    last_violation: Option<JidokaViolation>,
}

impl JidokaGuard {
    /// Create a new guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check an experiment without changing it.
    ///
    /// # Errors
    ///
    /// Returns the violation if any state variable is non-finite.
    pub fn check(&self, experiment: &dyn Experiment) -> Result<(), JidokaViolation> {
        if experiment.is_finite() {
            Ok(())
        } else {
            Err(JidokaViolation::NonFiniteValue {
                location: format!("{} at t={:.3}s", experiment.name(), experiment.time()),
            })
        }
    }

    /// Check an experiment and reset it if its state is non-finite.
    ///
    /// Returns whether a recovery took place.
    pub fn inspect(&mut self, experiment: &mut dyn Experiment) -> bool {
        match self.check(experiment) {
            Ok(()) => false,
            Err(violation) => {
                log::warn!("Jidoka: {violation}; resetting from current configuration");
                experiment.reset();
                self.recoveries += 1;
                self.last_violation = Some(violation);
                true
            }
        }
    }

    /// Number of recoveries performed.
    #[must_use]
    pub const fn recoveries(&self) -> u64 {
        self.recoveries
    }

    /// Most recent violation, if any.
    #[must_use]
    pub const fn last_violation(&self) -> Option<&JidokaViolation> {
        self.last_violation.as_ref()
    }

    /// Forget past recoveries.
    pub fn reset(&mut self) {
        self.recoveries = 0;
        self.last_violation = None;
    }
}
