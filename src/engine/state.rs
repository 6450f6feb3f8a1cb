//! Shared state primitives.
//!
//! Implements the body representation used by the orbital and collision
//! experiments:
//! - 2D vector arithmetic
//! - Rigid disc bodies with mass and radius
//! - Momentum and kinetic energy bookkeeping

use serde::{Deserialize, Serialize};

/// Smallest mass a body may carry; non-positive input is clamped up to this.
pub const MIN_MASS: f64 = 1e-9;

/// 2D vector for positions and velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vec2 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Magnitude squared.
    #[must_use]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Magnitude (length).
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Normalize to unit vector. The zero vector stays zero.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag < f64::EPSILON {
            Self::zero()
        } else {
            Self::new(self.x / mag, self.y / mag)
        }
    }

    /// Scale by scalar.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    /// Check if all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// A rigid disc used by the orbital and collision experiments.
///
/// A simulation owns its bodies in a `Vec`; the index is the body's stable
/// identity for pairwise iteration and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Position.
    pub position: Vec2,
    /// Velocity.
    pub velocity: Vec2,
    /// Mass (> 0).
    pub mass: f64,
    /// Radius (≥ 0).
    pub radius: f64,
}

impl Body {
    /// Create a new body. Mass is clamped to [`MIN_MASS`] and radius to zero.
    #[must_use]
    pub fn new(mass: f64, radius: f64, position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            mass: clamp_mass(mass),
            radius: if radius.is_finite() { radius.max(0.0) } else { 0.0 },
        }
    }

    /// Mass used by the integrators, clamped even if the field was edited directly.
    #[must_use]
    pub fn inertial_mass(&self) -> f64 {
        clamp_mass(self.mass)
    }

    /// Linear momentum m·v.
    #[must_use]
    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.inertial_mass()
    }

    /// Kinetic energy ½mv².
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.inertial_mass() * self.velocity.magnitude_squared()
    }

    /// Check if position and velocity are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

fn clamp_mass(mass: f64) -> f64 {
    if mass.is_finite() {
        mass.max(MIN_MASS)
    } else {
        MIN_MASS
    }
}

/// Total linear momentum Σ mᵢvᵢ.
#[must_use]
pub fn total_momentum(bodies: &[Body]) -> Vec2 {
    bodies
        .iter()
        .fold(Vec2::zero(), |acc, body| acc + body.momentum())
}

/// Total kinetic energy Σ ½mᵢvᵢ².
#[must_use]
pub fn total_kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::kinetic_energy).sum()
}

/// Centre of mass of a body set (origin for an empty set).
#[must_use]
pub fn center_of_mass(bodies: &[Body]) -> Vec2 {
    let total_mass: f64 = bodies.iter().map(Body::inertial_mass).sum();
    if total_mass <= 0.0 {
        return Vec2::zero();
    }
    let weighted = bodies
        .iter()
        .fold(Vec2::zero(), |acc, b| acc + b.position * b.inertial_mass());
    weighted * (1.0 / total_mass)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let v1 = Vec2::new(1.0, 2.0);
        let v2 = Vec2::new(4.0, 5.0);

        let sum = v1 + v2;
        assert!((sum.x - 5.0).abs() < f64::EPSILON);
        assert!((sum.y - 7.0).abs() < f64::EPSILON);

        let diff = v2 - v1;
        assert!((diff.x - 3.0).abs() < f64::EPSILON);

        assert!((v1.dot(&v2) - 14.0).abs() < f64::EPSILON);

        let v = Vec2::new(3.0, 4.0);
        assert!((v.magnitude() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_vec2_normalize() {
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.magnitude() - 1.0).abs() < 1e-12);

        let zero = Vec2::zero().normalize();
        assert_eq!(zero, Vec2::zero());
    }

    #[test]
    fn test_vec2_assign_ops() {
        let mut v = Vec2::new(1.0, 1.0);
        v += Vec2::new(2.0, 3.0);
        v -= Vec2::new(1.0, 1.0);
        assert_eq!(v, Vec2::new(2.0, 3.0));
        assert_eq!(-v, Vec2::new(-2.0, -3.0));
    }

    #[test]
    fn test_body_clamps_degenerate_input() {
        let body = Body::new(-3.0, -1.0, Vec2::zero(), Vec2::zero());
        assert!(body.mass > 0.0);
        assert!(body.radius.abs() < f64::EPSILON);

        let nan_body = Body::new(f64::NAN, f64::NAN, Vec2::zero(), Vec2::zero());
        assert!((nan_body.mass - MIN_MASS).abs() < f64::EPSILON);
        assert!(nan_body.radius.abs() < f64::EPSILON);
    }

    #[test]
    fn test_body_inertial_mass_after_direct_edit() {
        let mut body = Body::new(1.0, 0.0, Vec2::zero(), Vec2::zero());
        body.mass = 0.0;
        assert!(body.inertial_mass() > 0.0);
    }

    #[test]
    fn test_total_momentum_and_energy() {
        let bodies = [
            Body::new(1.0, 0.1, Vec2::new(-1.0, 0.0), Vec2::new(2.0, 0.0)),
            Body::new(2.0, 0.1, Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)),
        ];
        let p = total_momentum(&bodies);
        assert!(p.magnitude() < 1e-12);
        assert!((total_kinetic_energy(&bodies) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_center_of_mass() {
        let bodies = [
            Body::new(1.0, 0.0, Vec2::new(0.0, 0.0), Vec2::zero()),
            Body::new(3.0, 0.0, Vec2::new(4.0, 0.0), Vec2::zero()),
        ];
        let com = center_of_mass(&bodies);
        assert!((com.x - 3.0).abs() < 1e-12);
        assert!(com.y.abs() < 1e-12);
        assert_eq!(center_of_mass(&[]), Vec2::zero());
    }
}
