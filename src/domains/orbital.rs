//! Gravitational N-body integration.
//!
//! # Governing Equations
//!
//! ```text
//! Newton's Gravitation: F_ij = G·m_i·m_j / d² · r̂_ij,   d = max(|r_ij|, d_min)
//! Acceleration:         a_i  = Σ_j F_ij / m_i
//! Semi-implicit Euler:  v' = v + a·Δt,  x' = x + v'·Δt,  Δt = dt·time_scale
//! ```
//!
//! Forces are accumulated over unordered pairs in ascending `(i, j)` order and
//! applied with equal and opposite sign, so total momentum is conserved to
//! floating-point tolerance and results are reproducible step for step.
//!
//! Close encounters are not softened beyond the distance clamp; bodies that
//! pass near each other may be ejected at high speed, which is physically
//! meaningful and left alone.

use serde::{Deserialize, Serialize};

use super::clamp_timestep;
use crate::engine::state::{Body, Vec2};

/// Minimum separation used in the force law (world units).
pub const MIN_SEPARATION: f64 = 1e-3;

/// Bounds for the caller-supplied time-scale multiplier.
pub const MIN_TIME_SCALE: f64 = 1e-3;
/// Upper bound for the time-scale multiplier.
pub const MAX_TIME_SCALE: f64 = 1e3;

/// Per-step parameters for the orbital integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalParams {
    /// Gravitational constant G (world units), clamped to ≥ 0.
    pub gravitational_constant: f64,
    /// Multiplier applied to every frame's `dt`.
    pub time_scale: f64,
    /// Optional speed cap.
    ///
    /// This is a visualization safeguard that keeps ejected bodies on screen;
    /// it is not physical and breaks momentum conservation when it engages.
    /// `None` disables it.
    pub max_speed: Option<f64>,
}

impl Default for OrbitalParams {
    fn default() -> Self {
        Self {
            gravitational_constant: 1.0,
            time_scale: 1.0,
            max_speed: None,
        }
    }
}

impl OrbitalParams {
    /// Effective integration step `clamp(dt)·time_scale`.
    #[must_use]
    pub fn effective_dt(&self, dt: f64) -> f64 {
        let scale = if self.time_scale.is_nan() {
            1.0
        } else {
            self.time_scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
        };
        clamp_timestep(dt) * scale
    }

    fn g(&self) -> f64 {
        if self.gravitational_constant.is_finite() {
            self.gravitational_constant.max(0.0)
        } else {
            0.0
        }
    }
}

/// Semi-implicit Euler N-body integrator.
#[derive(Debug, Clone, Copy)]
pub struct OrbitalIntegrator {
    min_separation: f64,
}

impl Default for OrbitalIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitalIntegrator {
    /// Create an integrator using [`MIN_SEPARATION`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_separation: MIN_SEPARATION,
        }
    }

    /// Create an integrator with a custom separation clamp.
    #[must_use]
    pub fn with_min_separation(min_separation: f64) -> Self {
        let min_separation = if min_separation.is_finite() && min_separation > 0.0 {
            min_separation
        } else {
            MIN_SEPARATION
        };
        Self { min_separation }
    }

    /// Net gravitational force on every body, in insertion order.
    #[must_use]
    pub fn forces(&self, bodies: &[Body], gravitational_constant: f64) -> Vec<Vec2> {
        let n = bodies.len();
        let mut forces = vec![Vec2::zero(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let r_ij = bodies[j].position - bodies[i].position;
                let raw = r_ij.magnitude();
                if raw <= 0.0 || !raw.is_finite() {
                    // Coincident bodies have no defined direction.
                    continue;
                }
                let d = raw.max(self.min_separation);
                let magnitude = gravitational_constant
                    * bodies[i].inertial_mass()
                    * bodies[j].inertial_mass()
                    / (d * d);
                let force = r_ij * (magnitude / raw);
                forces[i] += force;
                forces[j] -= force;
            }
        }

        forces
    }

    /// Advance all bodies in place by one frame.
    pub fn step_in_place(&self, bodies: &mut [Body], params: &OrbitalParams, dt: f64) {
        let dt = params.effective_dt(dt);
        let forces = self.forces(bodies, params.g());

        for (body, force) in bodies.iter_mut().zip(forces) {
            let acceleration = force * (1.0 / body.inertial_mass());
            body.velocity += acceleration * dt;
            if let Some(max_speed) = params.max_speed {
                body.velocity = cap_speed(body.velocity, max_speed);
            }
            body.position += body.velocity * dt;
        }
    }

    /// Advance a copy of `bodies` by one frame and return it.
    #[must_use]
    pub fn step(&self, bodies: &[Body], params: &OrbitalParams, dt: f64) -> Vec<Body> {
        let mut next = bodies.to_vec();
        self.step_in_place(&mut next, params, dt);
        next
    }

    /// Total gravitational potential energy, using the same distance clamp.
    #[must_use]
    pub fn potential_energy(&self, bodies: &[Body], gravitational_constant: f64) -> f64 {
        let n = bodies.len();
        let mut pe = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let d = (bodies[j].position - bodies[i].position)
                    .magnitude()
                    .max(self.min_separation);
                pe -= gravitational_constant * bodies[i].inertial_mass() * bodies[j].inertial_mass()
                    / d;
            }
        }
        pe
    }
}

fn cap_speed(velocity: Vec2, max_speed: f64) -> Vec2 {
    if !max_speed.is_finite() || max_speed <= 0.0 {
        return velocity;
    }
    let speed = velocity.magnitude();
    if speed > max_speed {
        velocity * (max_speed / speed)
    } else {
        velocity
    }
}

/// Two bodies on a circular orbit about their common centre of mass.
///
/// The relative speed comes from the vis-viva relation for a circle,
/// `v = √(G(M + m)/r)`, split between the bodies so total momentum is zero.
#[must_use]
pub fn circular_pair(
    gravitational_constant: f64,
    central_mass: f64,
    orbiter_mass: f64,
    separation: f64,
) -> [Body; 2] {
    let central = Body::new(central_mass, 0.0, Vec2::zero(), Vec2::zero());
    let orbiter = Body::new(orbiter_mass, 0.0, Vec2::zero(), Vec2::zero());
    let m1 = central.inertial_mass();
    let m2 = orbiter.inertial_mass();
    let total = m1 + m2;
    let r = separation.abs().max(MIN_SEPARATION);
    let g = gravitational_constant.max(0.0);

    let v_rel = (g * total / r).sqrt();

    [
        Body {
            position: Vec2::new(-r * m2 / total, 0.0),
            velocity: Vec2::new(0.0, -v_rel * m2 / total),
            ..central
        },
        Body {
            position: Vec2::new(r * m1 / total, 0.0),
            velocity: Vec2::new(0.0, v_rel * m1 / total),
            ..orbiter
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::state::{center_of_mass, total_kinetic_energy, total_momentum};

    fn three_body() -> Vec<Body> {
        vec![
            Body::new(10.0, 0.2, Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0)),
            Body::new(1.0, 0.1, Vec2::new(5.0, 0.0), Vec2::new(0.0, 1.4)),
            Body::new(0.5, 0.1, Vec2::new(-3.0, 1.0), Vec2::new(-0.55, -1.65)),
        ]
    }

    #[test]
    fn test_pair_force_is_newtonian() {
        let bodies = [
            Body::new(2.0, 0.0, Vec2::new(0.0, 0.0), Vec2::zero()),
            Body::new(3.0, 0.0, Vec2::new(2.0, 0.0), Vec2::zero()),
        ];
        let forces = OrbitalIntegrator::new().forces(&bodies, 1.5);
        // F = 1.5·2·3/4 = 2.25, body 0 pulled toward +x
        assert!((forces[0].x - 2.25).abs() < 1e-12);
        assert!((forces[1].x + 2.25).abs() < 1e-12);
        assert!(forces[0].y.abs() < 1e-12);
    }

    #[test]
    fn test_near_zero_separation_is_clamped() {
        let bodies = [
            Body::new(1.0, 0.0, Vec2::new(0.0, 0.0), Vec2::zero()),
            Body::new(1.0, 0.0, Vec2::new(1e-9, 0.0), Vec2::zero()),
        ];
        let forces = OrbitalIntegrator::new().forces(&bodies, 1.0);
        let bound = 1.0 / (MIN_SEPARATION * MIN_SEPARATION);
        assert!(forces[0].x.is_finite());
        assert!(forces[0].x <= bound * (1.0 + 1e-9));
    }

    #[test]
    fn test_coincident_bodies_feel_no_force() {
        let bodies = [
            Body::new(1.0, 0.0, Vec2::new(1.0, 1.0), Vec2::zero()),
            Body::new(1.0, 0.0, Vec2::new(1.0, 1.0), Vec2::zero()),
        ];
        let forces = OrbitalIntegrator::new().forces(&bodies, 1.0);
        assert_eq!(forces[0], Vec2::zero());
        assert_eq!(forces[1], Vec2::zero());
    }

    #[test]
    fn test_single_body_drifts_freely() {
        let bodies = [Body::new(1.0, 0.0, Vec2::zero(), Vec2::new(1.0, 0.0))];
        let next = OrbitalIntegrator::new().step(&bodies, &OrbitalParams::default(), 0.01);
        assert!((next[0].position.x - 0.01).abs() < 1e-15);
        assert_eq!(next[0].velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_momentum_conserved() {
        let integrator = OrbitalIntegrator::new();
        let params = OrbitalParams::default();
        let mut bodies = three_body();
        let p0 = total_momentum(&bodies);

        for _ in 0..5_000 {
            integrator.step_in_place(&mut bodies, &params, 0.01);
            let p = total_momentum(&bodies);
            assert!((p - p0).magnitude() < 1e-10, "drift = {:?}", p - p0);
        }
    }

    #[test]
    fn test_time_scale_multiplies_dt() {
        let integrator = OrbitalIntegrator::new();
        let bodies = [Body::new(1.0, 0.0, Vec2::zero(), Vec2::new(1.0, 0.0))];
        let params = OrbitalParams {
            time_scale: 4.0,
            ..OrbitalParams::default()
        };
        let next = integrator.step(&bodies, &params, 0.01);
        assert!((next[0].position.x - 0.04).abs() < 1e-15);
    }

    #[test]
    fn test_step_is_deterministic() {
        let integrator = OrbitalIntegrator::new();
        let params = OrbitalParams::default();
        let mut a = three_body();
        let mut b = three_body();
        for _ in 0..1_000 {
            integrator.step_in_place(&mut a, &params, 0.01);
            integrator.step_in_place(&mut b, &params, 0.01);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_circular_pair_keeps_radius() {
        let integrator = OrbitalIntegrator::new();
        let params = OrbitalParams::default();
        let mut bodies = circular_pair(1.0, 100.0, 1.0, 10.0).to_vec();
        assert!(total_momentum(&bodies).magnitude() < 1e-12);
        assert!(center_of_mass(&bodies).magnitude() < 1e-12);

        // Relative period 2π√(r³/G(M+m)) ≈ 19.8 s; run two orbits.
        for _ in 0..4_000 {
            integrator.step_in_place(&mut bodies, &params, 0.01);
            let r = (bodies[1].position - bodies[0].position).magnitude();
            assert!((r - 10.0).abs() < 0.1, "r = {r}");
        }
    }

    #[test]
    fn test_energy_bounded_on_circular_orbit() {
        let integrator = OrbitalIntegrator::new();
        let params = OrbitalParams::default();
        let mut bodies = circular_pair(1.0, 100.0, 1.0, 10.0).to_vec();
        let e0 = total_kinetic_energy(&bodies) + integrator.potential_energy(&bodies, 1.0);
        for _ in 0..4_000 {
            integrator.step_in_place(&mut bodies, &params, 0.01);
        }
        let e1 = total_kinetic_energy(&bodies) + integrator.potential_energy(&bodies, 1.0);
        assert!(((e1 - e0) / e0).abs() < 1e-2);
    }

    #[test]
    fn test_speed_cap_engages() {
        let integrator = OrbitalIntegrator::new();
        let params = OrbitalParams {
            max_speed: Some(0.5),
            ..OrbitalParams::default()
        };
        let bodies = [Body::new(1.0, 0.0, Vec2::zero(), Vec2::new(3.0, 4.0))];
        let next = integrator.step(&bodies, &params, 0.01);
        assert!((next[0].velocity.magnitude() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_params_are_clamped() {
        let params = OrbitalParams {
            gravitational_constant: f64::NAN,
            time_scale: -3.0,
            max_speed: None,
        };
        assert!((params.effective_dt(0.01) - 0.01 * MIN_TIME_SCALE).abs() < 1e-18);
        let next = OrbitalIntegrator::new().step(&three_body(), &params, 0.01);
        assert!(next.iter().all(Body::is_finite));
    }
}
