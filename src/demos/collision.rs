//! Colliding discs experiment.
//!
//! # Governing Equations
//!
//! ```text
//! v' = v + g·dt,  x' = x + v'·dt              (free flight)
//! m_A·v_A + m_B·v_B = m_A·v_A' + m_B·v_B'     (every impact)
//! v_rel,n' = −e · v_rel,n                       (restitution)
//! ```
//!
//! Bodies fly freely, then every contact found after the move is resolved
//! once. Positions are never corrected after an impulse.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::orbital::BodyConfig;
use super::{kind_mismatch, Diagnostics, Experiment, ExperimentKind};
use crate::config::ExperimentConfig;
use crate::domains::clamp_timestep;
use crate::domains::collision::{clamp_restitution, CollisionResolver, Container};
use crate::engine::state::{center_of_mass, total_kinetic_energy, total_momentum, Body, Vec2};
use crate::error::SimResult;
use crate::renderers::{Bounds, Color, RenderCommand, RenderFrame};

/// Collision parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CollisionConfig {
    /// Coefficient of restitution e in [0, 1].
    pub restitution: f64,
    /// Uniform downward acceleration (0 disables gravity).
    pub gravity: f64,
    /// Optional bounding box.
    pub container: Option<Container>,
    /// Initial bodies.
    #[validate(length(min = 1, max = 64))]
    pub bodies: Vec<BodyConfig>,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self::head_on()
    }
}

impl CollisionConfig {
    /// Light fast disc meeting a heavy slow one; total momentum zero.
    #[must_use]
    pub fn head_on() -> Self {
        Self {
            restitution: 1.0,
            gravity: 0.0,
            container: None,
            bodies: vec![
                BodyConfig::new(1.0, 0.5, Vec2::new(-3.0, 0.0), Vec2::new(2.0, 0.0)),
                BodyConfig::new(2.0, 0.5, Vec2::new(3.0, 0.0), Vec2::new(-1.0, 0.0)),
            ],
        }
    }

    /// Six discs bouncing in a 20 × 10 box.
    #[must_use]
    pub fn billiards() -> Self {
        let bodies = (0..6)
            .map(|i| {
                let col = f64::from(i % 3);
                let row = f64::from(i / 3);
                let position = Vec2::new(4.0 + 6.0 * col, 3.0 + 4.0 * row);
                let velocity = Vec2::new(3.0 - 1.5 * col, 2.0 - 4.0 * row + col);
                BodyConfig::new(1.0 + 0.5 * col, 0.6 + 0.2 * row, position, velocity)
            })
            .collect();
        Self {
            restitution: 0.95,
            gravity: 0.0,
            container: Some(Container::new(20.0, 10.0)),
            bodies,
        }
    }

    /// Set the restitution coefficient.
    #[must_use]
    pub const fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the bounding box.
    #[must_use]
    pub const fn with_container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    /// Bodies in their initial state.
    #[must_use]
    pub fn initial_bodies(&self) -> Vec<Body> {
        self.bodies
            .iter()
            .take(super::orbital::MAX_BODIES)
            .map(BodyConfig::to_body)
            .collect()
    }
}

/// Discs with restitution, optionally boxed.
#[derive(Debug, Clone)]
pub struct CollisionExperiment {
    config: CollisionConfig,
    bodies: Vec<Body>,
    resolver: CollisionResolver,
    impacts: u64,
    time: f64,
    steps: u64,
}

impl Default for CollisionExperiment {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}

impl CollisionExperiment {
    /// Create the experiment at its initial state.
    #[must_use]
    pub fn new(config: CollisionConfig) -> Self {
        let bodies = config.initial_bodies();
        let resolver = CollisionResolver::new(config.restitution);
        Self {
            config,
            bodies,
            resolver,
            impacts: 0,
            time: 0.0,
            steps: 0,
        }
    }

    /// Current bodies.
    #[must_use]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Impacts resolved since the last reset.
    #[must_use]
    pub const fn impacts(&self) -> u64 {
        self.impacts
    }

    /// Apply a collision configuration directly.
    ///
    /// Changing the bodies or the container restarts; restitution and gravity
    /// apply to the running state.
    pub fn apply(&mut self, config: CollisionConfig) {
        let restart = config.bodies != self.config.bodies || config.container != self.config.container;
        self.resolver = CollisionResolver::new(config.restitution);
        self.config = config;
        if restart {
            self.reset();
        }
    }

    fn gravity(&self) -> f64 {
        if self.config.gravity.is_finite() {
            self.config.gravity
        } else {
            0.0
        }
    }

    fn bounds(&self) -> Bounds {
        if let Some(c) = &self.config.container {
            return Bounds::new(c.min.x, c.max.x, c.min.y, c.max.y);
        }
        let initial = self.config.bodies.iter().map(|b| (b.position.x, b.position.y));
        let margin = self.config.bodies.iter().map(|b| b.radius).fold(1.0, f64::max);
        Bounds::around(initial, margin * 3.0).unwrap_or_else(|| Bounds::centered(10.0))
    }
}

impl Experiment for CollisionExperiment {
    fn name(&self) -> &str {
        "Collisions"
    }

    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Collision
    }

    fn step(&mut self, dt: f64) {
        let dt = clamp_timestep(dt);
        let g = self.gravity();
        for body in &mut self.bodies {
            body.velocity.y -= g * dt;
            body.position += body.velocity * dt;
        }

        let count = self
            .resolver
            .resolve_all(&mut self.bodies, self.config.container.as_ref());
        self.impacts += (count.pairs + count.walls) as u64;
        self.time += dt;
        self.steps += 1;
    }

    fn reset(&mut self) {
        self.bodies = self.config.initial_bodies();
        self.impacts = 0;
        self.time = 0.0;
        self.steps = 0;
    }

    fn config(&self) -> ExperimentConfig {
        ExperimentConfig::Collision(self.config.clone())
    }

    fn configure(&mut self, config: ExperimentConfig) -> SimResult<()> {
        match config {
            ExperimentConfig::Collision(c) => {
                self.apply(c);
                Ok(())
            }
            other => Err(kind_mismatch(self.kind(), &other)),
        }
    }

    fn render(&self) -> RenderFrame {
        let mut frame = RenderFrame::new(self.name(), self.time, self.bounds());
        frame.push(RenderCommand::Clear { color: Color::BLACK });

        if let Some(c) = &self.config.container {
            let corners = vec![
                (c.min.x, c.min.y),
                (c.max.x, c.min.y),
                (c.max.x, c.max.y),
                (c.min.x, c.max.y),
                (c.min.x, c.min.y),
            ];
            frame.push(RenderCommand::Polyline {
                points: corners,
                color: Color::GREY,
            });
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
        let corner = (frame.bounds.min_x, frame.bounds.max_y);
        frame.push(RenderCommand::Text {
            x: corner.0,
            y: corner.1,
            text: format!("e = {:.2}", clamp_restitution(self.config.restitution)),
            color: Color::WHITE,
        });
        frame
    }

    fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            time: self.time,
            steps: self.steps,
            kinetic_energy: Some(total_kinetic_energy(&self.bodies)),
            momentum: Some(total_momentum(&self.bodies)),
            center_of_mass: Some(center_of_mass(&self.bodies)),
            impacts: Some(self.impacts),
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
