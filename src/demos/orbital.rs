//! Gravitational N-body experiment.
//!
//! # Governing Equations
//!
//! ```text
//! F_ij = G·m_i·m_j / max(r_ij, r_min)² · r̂_ij
//! E    = Σ ½m_i v_i² − Σ_{i<j} G·m_i·m_j / r_ij
//! P    = Σ m_i v_i                                (conserved)
//! ```
//!
//! Each body keeps a bounded trail of recent positions for drawing.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{kind_mismatch, Diagnostics, Experiment, ExperimentKind};
use crate::config::ExperimentConfig;
use crate::domains::orbital::{circular_pair, OrbitalIntegrator, OrbitalParams};
use crate::engine::state::{center_of_mass, total_kinetic_energy, total_momentum, Body, Vec2};
use crate::error::SimResult;
use crate::renderers::{Bounds, Color, RenderCommand, RenderFrame};

/// Largest number of bodies a configuration may declare.
pub const MAX_BODIES: usize = 64;

/// Largest trail length per body.
pub const MAX_TRAIL_LENGTH: usize = 10_000;

/// Initial conditions for one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    /// Mass.
    pub mass: f64,
    /// Drawn and collision radius.
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Initial position.
    pub position: Vec2,
    /// Initial velocity.
    #[serde(default)]
    pub velocity: Vec2,
}

fn default_radius() -> f64 {
    0.2
}

impl BodyConfig {
    /// Create a body description.
    #[must_use]
    pub const fn new(mass: f64, radius: f64, position: Vec2, velocity: Vec2) -> Self {
        Self {
            mass,
            radius,
            position,
            velocity,
        }
    }

    /// Body in its initial state.
    #[must_use]
    pub fn to_body(&self) -> Body {
        Body::new(self.mass, self.radius, self.position, self.velocity)
    }
}

/// N-body parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OrbitalConfig {
    /// Gravitational constant G.
    pub gravitational_constant: f64,
    /// Simulation seconds per wall-clock second.
    pub time_scale: f64,
    /// Optional speed cap; off unless set.
    pub max_speed: Option<f64>,
    /// Positions kept per body trail (0 disables trails).
    #[validate(range(max = 10_000))]
    pub trail_length: usize,
    /// Initial bodies.
    #[validate(length(min = 1, max = 64))]
    pub bodies: Vec<BodyConfig>,
}

impl Default for OrbitalConfig {
    fn default() -> Self {
        Self::two_body_circular()
    }
}

impl OrbitalConfig {
    /// Heavy star and light planet on a circular orbit of radius 10.
    #[must_use]
    pub fn two_body_circular() -> Self {
        let g = 1.0;
        let [star, planet] = circular_pair(g, 100.0, 1.0, 10.0);
        Self {
            gravitational_constant: g,
            time_scale: 1.0,
            max_speed: None,
            trail_length: 300,
            bodies: vec![
                BodyConfig::new(star.mass, 1.0, star.position, star.velocity),
                BodyConfig::new(planet.mass, 0.3, planet.position, planet.velocity),
            ],
        }
    }

    /// Star with an inner planet and a counter-rotating outer planet.
    #[must_use]
    pub fn three_body() -> Self {
        let g = 1.0;
        let v_inner = (g * 100.0 / 10.0_f64).sqrt();
        let v_outer = (g * 100.0 / 16.0_f64).sqrt();
        Self {
            gravitational_constant: g,
            time_scale: 1.0,
            max_speed: Some(50.0),
            trail_length: 400,
            bodies: vec![
                BodyConfig::new(100.0, 1.0, Vec2::zero(), Vec2::zero()),
                BodyConfig::new(1.0, 0.3, Vec2::new(10.0, 0.0), Vec2::new(0.0, v_inner)),
                BodyConfig::new(0.5, 0.25, Vec2::new(-16.0, 0.0), Vec2::new(0.0, -v_outer)),
            ],
        }
    }

    /// Set the time scale.
    #[must_use]
    pub const fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Set the gravitational constant.
    #[must_use]
    pub const fn with_gravitational_constant(mut self, g: f64) -> Self {
        self.gravitational_constant = g;
        self
    }

    /// Integrator parameters.
    #[must_use]
    pub const fn params(&self) -> OrbitalParams {
        OrbitalParams {
            gravitational_constant: self.gravitational_constant,
            time_scale: self.time_scale,
            max_speed: self.max_speed,
        }
    }

    /// Bodies in their initial state, truncated to [`MAX_BODIES`].
    #[must_use]
    pub fn initial_bodies(&self) -> Vec<Body> {
        self.bodies.iter().take(MAX_BODIES).map(BodyConfig::to_body).collect()
    }
}

/// Bounded history of positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    points: VecDeque<(f64, f64)>,
    max_length: usize,
}

impl Trail {
    /// Create an empty trail holding at most `max_length` points.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        let max_length = max_length.min(MAX_TRAIL_LENGTH);
        Self {
            points: VecDeque::with_capacity(max_length),
            max_length,
        }
    }

    /// Append a point, dropping the oldest once full.
    pub fn push(&mut self, point: Vec2) {
        if self.max_length == 0 {
            return;
        }
        if self.points.len() >= self.max_length {
            self.points.pop_front();
        }
        self.points.push_back((point.x, point.y));
    }

    /// Points oldest first.
    #[must_use]
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.points.iter().copied().collect()
    }

    /// Number of points held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the trail is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Gravitating bodies with trails.
#[derive(Debug, Clone)]
pub struct OrbitalExperiment {
    config: OrbitalConfig,
    bodies: Vec<Body>,
    trails: Vec<Trail>,
    integrator: OrbitalIntegrator,
    time: f64,
    steps: u64,
}

impl Default for OrbitalExperiment {
    fn default() -> Self {
        Self::new(OrbitalConfig::default())
    }
}

impl OrbitalExperiment {
    /// Create the experiment at its initial state.
    #[must_use]
    pub fn new(config: OrbitalConfig) -> Self {
        let bodies = config.initial_bodies();
        let trails = fresh_trails(&bodies, config.trail_length);
        Self {
            config,
            bodies,
            trails,
            integrator: OrbitalIntegrator::new(),
            time: 0.0,
            steps: 0,
        }
    }

    /// Current bodies.
    #[must_use]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Per-body trails, in body order.
    #[must_use]
    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    /// Apply an orbital configuration directly.
    ///
    /// A changed body list restarts the experiment; the other parameters
    /// apply to the running state.
    pub fn apply(&mut self, config: OrbitalConfig) {
        let restart = config.bodies != self.config.bodies;
        let trail_changed = config.trail_length != self.config.trail_length;
        self.config = config;
        if restart {
            self.reset();
        } else if trail_changed {
            self.trails = fresh_trails(&self.bodies, self.config.trail_length);
        }
    }

    /// Total energy (kinetic plus potential).
    #[must_use]
    pub fn total_energy(&self) -> f64 {
        total_kinetic_energy(&self.bodies) + self.potential_energy()
    }

    fn potential_energy(&self) -> f64 {
        let g = self.config.gravitational_constant;
        let g = if g.is_finite() { g.max(0.0) } else { 0.0 };
        self.integrator.potential_energy(&self.bodies, g)
    }

    fn bounds(&self) -> Bounds {
        let initial = self.config.bodies.iter().map(|b| (b.position.x, b.position.y));
        let extent = Bounds::around(initial, 0.0)
            .map_or(10.0, |b| b.min_x.abs().max(b.max_x.abs()).max(b.min_y.abs()).max(b.max_y.abs()));
        Bounds::centered(extent.max(1.0) * 1.3)
    }
}

fn fresh_trails(bodies: &[Body], max_length: usize) -> Vec<Trail> {
    bodies
        .iter()
        .map(|b| {
            let mut trail = Trail::new(max_length);
            trail.push(b.position);
            trail
        })
        .collect()
}

impl Experiment for OrbitalExperiment {
    fn name(&self) -> &str {
        "Orbital Mechanics"
    }

    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Orbital
    }

    fn step(&mut self, dt: f64) {
        let params = self.config.params();
        self.integrator.step_in_place(&mut self.bodies, &params, dt);
        for (trail, body) in self.trails.iter_mut().zip(&self.bodies) {
            trail.push(body.position);
        }
        self.time += params.effective_dt(dt);
        self.steps += 1;
    }

    fn reset(&mut self) {
        self.bodies = self.config.initial_bodies();
        self.trails = fresh_trails(&self.bodies, self.config.trail_length);
        self.time = 0.0;
        self.steps = 0;
    }

    fn config(&self) -> ExperimentConfig {
        ExperimentConfig::Orbital(self.config.clone())
    }

    fn configure(&mut self, config: ExperimentConfig) -> SimResult<()> {
        match config {
            ExperimentConfig::Orbital(c) => {
                self.apply(c);
                Ok(())
            }
            other => Err(kind_mismatch(self.kind(), &other)),
        }
    }

    fn render(&self) -> RenderFrame {
        let mut frame = RenderFrame::new(self.name(), self.time, self.bounds());
        frame.push(RenderCommand::Clear { color: Color::BLACK });

        for (i, trail) in self.trails.iter().enumerate() {
            if trail.len() > 1 {
                frame.push(RenderCommand::Polyline {
                    points: trail.points(),
                    color: Color::palette(i).with_alpha(128),
                });
            }
        }
        for (i, body) in self.bodies.iter().enumerate() {
            frame.push(RenderCommand::Circle {
                x: body.position.x,
                y: body.position.y,
                radius: body.radius,
                color: Color::palette(i),
                filled: true,
            });
        }
        frame
    }

    fn diagnostics(&self) -> Diagnostics {
        let kinetic = total_kinetic_energy(&self.bodies);
        let potential = self.potential_energy();
        Diagnostics {
            time: self.time,
            steps: self.steps,
            kinetic_energy: Some(kinetic),
            potential_energy: Some(potential),
            total_energy: Some(kinetic + potential),
            momentum: Some(total_momentum(&self.bodies)),
            center_of_mass: Some(center_of_mass(&self.bodies)),
            ..Diagnostics::default()
        }
    }

    fn is_finite(&self) -> bool {
        self.bodies.iter().all(Body::is_finite)
    }

    fn time(&self) -> f64 {
        self.time
    }
}
