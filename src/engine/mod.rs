//! Frame engine.
//!
//! Drives registered experiments once per display refresh:
//! - Simulation clock with fixed-step or wall-clock planning
//! - Frame scheduler with pause, resume, reset, and unregister
//! - Jidoka guard that recovers from non-finite state
//! - Shared body state primitives

pub mod clock;
pub mod jidoka;
pub mod scheduler;
pub mod state;

use serde::{Deserialize, Serialize};

pub use clock::{refresh_interval, FramePlan, SimClock};
pub use jidoka::{JidokaGuard, JidokaViolation};
pub use scheduler::{FrameScheduler, RegistrationId};
pub use state::{Body, Vec2};

/// Simulation time representation.
///
/// Stored as integer nanoseconds so repeated additions of the same step
/// never drift.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SimTime {
    /// Time in nanoseconds from the last reset.
    nanos: u64,
}

impl SimTime {
    /// Zero time.
    pub const ZERO: Self = Self { nanos: 0 };

    /// Create time from seconds. Negative or NaN input maps to zero and
    /// overly large input saturates.
    #[must_use]
    pub fn from_secs(secs: f64) -> Self {
        if !(secs > 0.0) {
            return Self::ZERO;
        }
        let nanos = (secs * 1_000_000_000.0).round();
        if nanos >= u64::MAX as f64 {
            Self { nanos: u64::MAX }
        } else {
            Self { nanos: nanos as u64 }
        }
    }

    /// Create time from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Get time as seconds (f64).
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Get time as nanoseconds.
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.nanos
    }

    /// Add a duration in nanoseconds, saturating.
    #[must_use]
    pub const fn add_nanos(self, nanos: u64) -> Self {
        Self {
            nanos: self.nanos.saturating_add(nanos),
        }
    }
}

impl std::ops::Add for SimTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.add_nanos(rhs.nanos)
    }
}

impl std::ops::Sub for SimTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            nanos: self.nanos.saturating_sub(rhs.nanos),
        }
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}
