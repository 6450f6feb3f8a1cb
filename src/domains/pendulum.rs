//! Damped simple pendulum.
//!
//! # Governing Equations
//!
//! ```text
//! Angular acceleration: α = -(g/L)·sin θ - c·ω
//! Energy (per unit mass): E = ½L²ω² + gL(1 - cos θ)
//! Small-angle period:   T = 2π·√(L/g)
//! ```
//!
//! Integrated with semi-implicit (symplectic) Euler: velocity first, then
//! position with the updated velocity. Explicit Euler injects energy into an
//! undamped pendulum every cycle; the symplectic ordering keeps the peak
//! amplitude bounded.

use serde::{Deserialize, Serialize};

use super::clamp_timestep;
use crate::engine::state::Vec2;

/// Shortest pendulum length; non-positive lengths are clamped up to this.
pub const MIN_LENGTH: f64 = 1e-3;

/// Pendulum state and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    /// Angle from the downward vertical (rad).
    pub angle: f64,
    /// Angular velocity (rad/s).
    pub angular_velocity: f64,
    /// Length (m), always ≥ [`MIN_LENGTH`].
    pub length: f64,
    /// Gravitational acceleration (m/s²), always ≥ 0.
    pub gravity: f64,
    /// Damping coefficient (1/s), always ≥ 0.
    pub damping: f64,
}

impl PendulumState {
    /// Create a pendulum state, clamping parameters into their valid ranges.
    #[must_use]
    pub fn new(angle: f64, angular_velocity: f64, length: f64, gravity: f64, damping: f64) -> Self {
        Self {
            angle: finite_or_zero(angle),
            angular_velocity: finite_or_zero(angular_velocity),
            length: clamp_length(length),
            gravity: non_negative(gravity),
            damping: non_negative(damping),
        }
    }

    /// Pendulum released from rest at `angle_deg` degrees.
    #[must_use]
    pub fn at_rest(angle_deg: f64, length: f64, gravity: f64, damping: f64) -> Self {
        Self::new(angle_deg.to_radians(), 0.0, length, gravity, damping)
    }

    /// Angular acceleration α = -(g/L)·sin θ - c·ω.
    #[must_use]
    pub fn angular_acceleration(&self) -> f64 {
        let length = clamp_length(self.length);
        -(self.gravity / length) * self.angle.sin() - self.damping * self.angular_velocity
    }

    /// Mechanical energy per unit mass, zero at rest hanging straight down.
    #[must_use]
    pub fn energy(&self) -> f64 {
        let l = clamp_length(self.length);
        0.5 * l * l * self.angular_velocity * self.angular_velocity
            + self.gravity * l * (1.0 - self.angle.cos())
    }

    /// Bob position relative to the pivot, y pointing up.
    #[must_use]
    pub fn bob_position(&self) -> Vec2 {
        let l = clamp_length(self.length);
        Vec2::new(l * self.angle.sin(), -l * self.angle.cos())
    }

    /// Small-angle period 2π·√(L/g); infinite when g = 0.
    #[must_use]
    pub fn small_angle_period(&self) -> f64 {
        if self.gravity <= 0.0 {
            return f64::INFINITY;
        }
        2.0 * std::f64::consts::PI * (clamp_length(self.length) / self.gravity).sqrt()
    }

    /// Check if angle and angular velocity are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.angle.is_finite() && self.angular_velocity.is_finite()
    }
}

/// Semi-implicit Euler integrator for [`PendulumState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PendulumIntegrator;

impl PendulumIntegrator {
    /// Create a new integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Advance the pendulum by `dt` seconds and return the new state.
    ///
    /// `dt` is clamped into `[MIN_DT, MAX_DT]`.
    #[must_use]
    pub fn step(&self, state: &PendulumState, dt: f64) -> PendulumState {
        let dt = clamp_timestep(dt);
        let alpha = state.angular_acceleration();

        // ω' = ω + α·dt, then θ' = θ + ω'·dt
        let angular_velocity = state.angular_velocity + alpha * dt;
        let angle = state.angle + angular_velocity * dt;

        PendulumState {
            angle,
            angular_velocity,
            length: clamp_length(state.length),
            gravity: non_negative(state.gravity),
            damping: non_negative(state.damping),
        }
    }
}

/// Measures the oscillation period from upward zero crossings of the angle.
///
/// Crossing times are linearly interpolated between samples, so the estimate
/// does not quantize to the frame time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodEstimator {
    last_angle: Option<f64>,
    last_time: f64,
    crossings: Vec<f64>,
}

impl PeriodEstimator {
    /// Create an empty estimator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the angle at simulation time `time`.
    pub fn observe(&mut self, time: f64, angle: f64) {
        if let Some(prev) = self.last_angle {
            if prev < 0.0 && angle >= 0.0 {
                let span = angle - prev;
                let frac = if span > 0.0 { -prev / span } else { 0.0 };
                self.crossings
                    .push(self.last_time + frac * (time - self.last_time));
            }
        }
        self.last_angle = Some(angle);
        self.last_time = time;
    }

    /// Number of complete cycles observed.
    #[must_use]
    pub fn cycles(&self) -> usize {
        self.crossings.len().saturating_sub(1)
    }

    /// Mean period over all complete cycles, if at least one was observed.
    #[must_use]
    pub fn period(&self) -> Option<f64> {
        let first = self.crossings.first()?;
        let last = self.crossings.last()?;
        let cycles = self.cycles();
        if cycles == 0 {
            return None;
        }
        Some((last - first) / cycles as f64)
    }

    /// Forget all observations.
    pub fn clear(&mut self) {
        self.last_angle = None;
        self.last_time = 0.0;
        self.crossings.clear();
    }
}

fn clamp_length(length: f64) -> f64 {
    if length.is_finite() && length > MIN_LENGTH {
        length
    } else {
        MIN_LENGTH
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
