//! Simulation clock management.
//!
//! Turns the wall time between display refreshes into integration steps:
//! - Fixed mode accumulates elapsed time and releases whole `nominal_dt`
//!   steps, at most `max_substeps` per refresh
//! - Wall mode takes one step of the measured elapsed time
//!
//! Every step is clamped into `[min_dt, max_dt]`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{SchedulerConfig, TimestepMode};
use crate::domains::{MAX_DT, MIN_DT};
use crate::engine::SimTime;

/// Longest refresh interval handed to the scheduler (s).
pub const MAX_REFRESH_INTERVAL: f64 = 1.0;

/// Refresh interval for `secs` seconds.
///
/// Negative and non-finite input maps to zero; anything longer than
/// [`MAX_REFRESH_INTERVAL`] is capped, since a stall that long is dropped
/// by either timestep mode anyway.
#[must_use]
pub fn refresh_interval(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs.min(MAX_REFRESH_INTERVAL))
    } else {
        Duration::ZERO
    }
}

/// Steps to take for one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePlan {
    /// Number of steps.
    pub substeps: u32,
    /// Size of each step (s).
    pub dt: f64,
    /// Elapsed time discarded because the substep limit was hit (s).
    pub dropped: f64,
}

impl FramePlan {
    /// Total simulated time covered by the plan.
    #[must_use]
    pub fn simulated(&self) -> f64 {
        f64::from(self.substeps) * self.dt
    }
}

/// Simulation clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    mode: TimestepMode,
    nominal_dt: f64,
    min_dt: f64,
    max_dt: f64,
    max_substeps: u32,
    /// Unconsumed elapsed time in fixed mode.
    accumulator: f64,
    current: SimTime,
    step_count: u64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

impl SimClock {
    /// Create a clock from scheduler settings. Bounds are clamped into
    /// `[MIN_DT, MAX_DT]` and `nominal_dt` into the resulting range.
    #[must_use]
    pub fn from_config(config: &SchedulerConfig) -> Self {
        let min_dt = sanitize(config.min_dt, MIN_DT);
        let max_dt = sanitize(config.max_dt, MAX_DT).max(min_dt);
        let nominal_dt = sanitize(config.nominal_dt, 1.0 / 60.0).clamp(min_dt, max_dt);
        Self {
            mode: config.timestep_mode,
            nominal_dt,
            min_dt,
            max_dt,
            max_substeps: config.max_substeps.max(1),
            accumulator: 0.0,
            current: SimTime::ZERO,
            step_count: 0,
        }
    }

    /// Fixed-mode clock with the given step.
    #[must_use]
    pub fn fixed(dt: f64) -> Self {
        Self::from_config(&SchedulerConfig::default().with_nominal_dt(dt))
    }

    /// Wall-mode clock.
    #[must_use]
    pub fn wall() -> Self {
        Self::from_config(&SchedulerConfig::default().wall_clock())
    }

    /// Stepping mode.
    #[must_use]
    pub const fn mode(&self) -> TimestepMode {
        self.mode
    }

    /// Fixed step size (s).
    #[must_use]
    pub const fn nominal_dt(&self) -> f64 {
        self.nominal_dt
    }

    /// Current simulation time.
    #[must_use]
    pub const fn current_time(&self) -> SimTime {
        self.current
    }

    /// Number of steps taken.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Clamp a step into `[min_dt, max_dt]`; NaN maps to `min_dt`.
    #[must_use]
    pub fn clamp_dt(&self, dt: f64) -> f64 {
        if dt.is_nan() {
            self.min_dt
        } else {
            dt.clamp(self.min_dt, self.max_dt)
        }
    }

    /// Plan the steps for a refresh that arrived `elapsed` seconds after
    /// the previous one.
    pub fn plan_frame(&mut self, elapsed: f64) -> FramePlan {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };

        match self.mode {
            TimestepMode::Wall => FramePlan {
                substeps: 1,
                dt: self.clamp_dt(elapsed),
                dropped: (elapsed - self.max_dt).max(0.0),
            },
            TimestepMode::Fixed => {
                self.accumulator += elapsed;
                let dt = self.nominal_dt;
                // refresh intervals arrive rounded to whole nanoseconds
                let available = ((self.accumulator + 1e-9) / dt).floor();
                let substeps = available.min(f64::from(self.max_substeps)).max(0.0) as u32;
                self.accumulator = (self.accumulator - f64::from(substeps) * dt).max(0.0);

                let mut dropped = 0.0;
                if substeps == self.max_substeps && self.accumulator >= dt {
                    dropped = self.accumulator;
                    self.accumulator = 0.0;
                }
                FramePlan { substeps, dt, dropped }
            }
        }
    }

    /// Record one step of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.current = self.current + SimTime::from_secs(dt);
        self.step_count += 1;
    }

    /// Reset to time zero with an empty accumulator.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.current = SimTime::ZERO;
        self.step_count = 0;
    }
}

fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.clamp(MIN_DT, MAX_DT)
    } else {
        fallback
    }
}
