//! Damped pendulum experiment.
//!
//! # Governing Equations
//!
//! ```text
//! θ̈ = −(g/L)·sin θ − c·θ̇
//! E/m = ½L²θ̇² + gL(1 − cos θ)
//! T ≈ 2π√(L/g)            (small angles)
//! ```
//!
//! Length and initial angle define the initial condition, so changing either
//! restarts the swing. Gravity and damping apply to the running state.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{kind_mismatch, Diagnostics, Experiment, ExperimentKind};
use crate::config::ExperimentConfig;
use crate::domains::pendulum::{PendulumIntegrator, PendulumState, PeriodEstimator};
use crate::error::SimResult;
use crate::renderers::{Bounds, Color, RenderCommand, RenderFrame};

/// Pendulum parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PendulumConfig {
    /// Rod length L (m).
    pub length: f64,
    /// Gravitational acceleration g (m/s²).
    pub gravity: f64,
    /// Release angle from vertical (degrees).
    pub initial_angle_deg: f64,
    /// Linear damping coefficient c (1/s).
    pub damping: f64,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            length: 1.0,
            gravity: 9.81,
            initial_angle_deg: 30.0,
            damping: 0.1,
        }
    }
}

impl PendulumConfig {
    /// Undamped 10° swing, close to simple harmonic motion.
    #[must_use]
    pub fn small_angle() -> Self {
        Self {
            initial_angle_deg: 10.0,
            damping: 0.0,
            ..Self::default()
        }
    }

    /// Heavily damped 60° release.
    #[must_use]
    pub fn damped() -> Self {
        Self {
            initial_angle_deg: 60.0,
            damping: 0.5,
            ..Self::default()
        }
    }

    /// Set the rod length.
    #[must_use]
    pub const fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    /// Set the release angle.
    #[must_use]
    pub const fn with_initial_angle_deg(mut self, angle: f64) -> Self {
        self.initial_angle_deg = angle;
        self
    }

    /// Set the damping coefficient.
    #[must_use]
    pub const fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Initial state released from rest.
    #[must_use]
    pub fn initial_state(&self) -> PendulumState {
        PendulumState::at_rest(self.initial_angle_deg, self.length, self.gravity, self.damping)
    }
}

/// Damped pendulum with period measurement.
#[derive(Debug, Clone)]
pub struct PendulumExperiment {
    config: PendulumConfig,
    state: PendulumState,
    integrator: PendulumIntegrator,
    period: PeriodEstimator,
    time: f64,
    steps: u64,
}

impl Default for PendulumExperiment {
    fn default() -> Self {
        Self::new(PendulumConfig::default())
    }
}

impl PendulumExperiment {
    /// Create the experiment at its initial state.
    #[must_use]
    pub fn new(config: PendulumConfig) -> Self {
        let state = config.initial_state();
        Self {
            config,
            state,
            integrator: PendulumIntegrator::new(),
            period: PeriodEstimator::new(),
            time: 0.0,
            steps: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &PendulumState {
        &self.state
    }

    /// Measured period, once two upward zero crossings have been seen.
    #[must_use]
    pub fn measured_period(&self) -> Option<f64> {
        self.period.period()
    }

    /// Apply a pendulum configuration directly.
    pub fn apply(&mut self, config: PendulumConfig) {
        let restart = config.length != self.config.length
            || config.initial_angle_deg != self.config.initial_angle_deg;
        self.config = config;
        if restart {
            self.reset();
        } else {
            self.state = PendulumState::new(
                self.state.angle,
                self.state.angular_velocity,
                self.state.length,
                self.config.gravity,
                self.config.damping,
            );
        }
    }
}

impl Experiment for PendulumExperiment {
    fn name(&self) -> &str {
        "Damped Pendulum"
    }

    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Pendulum
    }

    fn step(&mut self, dt: f64) {
        self.state = self.integrator.step(&self.state, dt);
        self.time += crate::domains::clamp_timestep(dt);
        self.steps += 1;
        self.period.observe(self.time, self.state.angle);
    }

    fn reset(&mut self) {
        self.state = self.config.initial_state();
        self.period.clear();
        self.time = 0.0;
        self.steps = 0;
    }

    fn config(&self) -> ExperimentConfig {
        ExperimentConfig::Pendulum(self.config.clone())
    }

    fn configure(&mut self, config: ExperimentConfig) -> SimResult<()> {
        match config {
            ExperimentConfig::Pendulum(c) => {
                self.apply(c);
                Ok(())
            }
            other => Err(kind_mismatch(self.kind(), &other)),
        }
    }

    fn render(&self) -> RenderFrame {
        let l = self.state.length;
        let bob = self.state.bob_position();
        let mut frame = RenderFrame::new(self.name(), self.time, Bounds::centered(l * 1.25));

        frame.push(RenderCommand::Clear { color: Color::BLACK });
        frame.push(RenderCommand::Line {
            x1: 0.0,
            y1: 0.0,
            x2: bob.x,
            y2: bob.y,
            color: Color::GREY,
        });
        frame.push(RenderCommand::Circle {
            x: 0.0,
            y: 0.0,
            radius: l * 0.02,
            color: Color::WHITE,
            filled: true,
        });
        frame.push(RenderCommand::Circle {
            x: bob.x,
            y: bob.y,
            radius: l * 0.08,
            color: Color::BLUE,
            filled: true,
        });
        frame.push(RenderCommand::Text {
            x: -l * 1.2,
            y: l * 1.15,
            text: format!("θ = {:.1}°", self.state.angle.to_degrees()),
            color: Color::WHITE,
        });
        frame
    }

    fn diagnostics(&self) -> Diagnostics {
        let s = &self.state;
        let kinetic = 0.5 * s.length * s.length * s.angular_velocity * s.angular_velocity;
        let potential = s.gravity * s.length * (1.0 - s.angle.cos());
        Diagnostics {
            time: self.time,
            steps: self.steps,
            kinetic_energy: Some(kinetic),
            potential_energy: Some(potential),
            total_energy: Some(s.energy()),
            period: self.period.period(),
            ..Diagnostics::default()
        }
    }

    fn is_finite(&self) -> bool {
        self.state.is_finite()
    }

    fn time(&self) -> f64 {
        self.time
    }
}
