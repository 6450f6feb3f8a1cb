//! Rigid-disc collisions with a coefficient of restitution.
//!
//! # Governing Equations
//!
//! Along the contact normal `n = normalize(p_B - p_A)`:
//!
//! ```text
//! v_n_A' = ((m_A - e·m_B)·v_n_A + (1+e)·m_B·v_n_B) / (m_A + m_B)
//! v_n_B' = ((m_B - e·m_A)·v_n_B + (1+e)·m_A·v_n_A) / (m_A + m_B)
//! ```
//!
//! Tangential components pass through unchanged (frictionless contact).
//! Walls are immovable bodies of infinite mass: the normal component is
//! negated and scaled by `e`.
//!
//! Overlapping bodies are not pushed apart after the impulse. Deep
//! interpenetration can therefore stay visible for a few frames; the
//! closing-velocity test keeps such pairs from being resolved twice.

use serde::{Deserialize, Serialize};

use crate::engine::state::{Body, Vec2};

/// Clamp a restitution coefficient into `[0, 1]` (NaN → 1).
#[must_use]
pub fn clamp_restitution(restitution: f64) -> f64 {
    if restitution.is_nan() {
        1.0
    } else {
        restitution.clamp(0.0, 1.0)
    }
}

/// Whether two discs overlap or touch: `|p_A - p_B| ≤ r_A + r_B`.
#[must_use]
pub fn in_contact(a: &Body, b: &Body) -> bool {
    (a.position - b.position).magnitude() <= a.radius + b.radius
}

/// Whether the bodies approach each other along the contact normal.
#[must_use]
pub fn is_closing(a: &Body, b: &Body) -> bool {
    let n = (b.position - a.position).normalize();
    (b.velocity - a.velocity).dot(&n) < 0.0
}

/// Post-impact velocities of two bodies for restitution `e`.
///
/// Coincident centres have no contact normal; the velocities are returned
/// unchanged in that case.
#[must_use]
pub fn resolve(a: &Body, b: &Body, restitution: f64) -> (Vec2, Vec2) {
    let n = (b.position - a.position).normalize();
    if n == Vec2::zero() {
        return (a.velocity, b.velocity);
    }

    let e = clamp_restitution(restitution);
    let m_a = a.inertial_mass();
    let m_b = b.inertial_mass();
    let total = m_a + m_b;

    let vn_a = a.velocity.dot(&n);
    let vn_b = b.velocity.dot(&n);
    let vt_a = a.velocity - n * vn_a;
    let vt_b = b.velocity - n * vn_b;

    let vn_a_new = ((m_a - e * m_b) * vn_a + (1.0 + e) * m_b * vn_b) / total;
    let vn_b_new = ((m_b - e * m_a) * vn_b + (1.0 + e) * m_a * vn_a) / total;

    (vt_a + n * vn_a_new, vt_b + n * vn_b_new)
}

/// Axis-aligned rectangular container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl Container {
    /// Container spanning `[0, width] × [0, height]`.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            min: Vec2::zero(),
            max: Vec2::new(width.abs(), height.abs()),
        }
    }

    /// Width of the container.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the container.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Velocity after any wall impacts, or `None` if the body touches no wall
/// it is moving into.
#[must_use]
pub fn resolve_boundary(body: &Body, container: &Container, restitution: f64) -> Option<Vec2> {
    let e = clamp_restitution(restitution);
    let p = body.position;
    let r = body.radius;
    let mut v = body.velocity;
    let mut hit = false;

    if p.x - r <= container.min.x && v.x < 0.0 || p.x + r >= container.max.x && v.x > 0.0 {
        v.x = -e * v.x;
        hit = true;
    }
    if p.y - r <= container.min.y && v.y < 0.0 || p.y + r >= container.max.y && v.y > 0.0 {
        v.y = -e * v.y;
        hit = true;
    }

    hit.then_some(v)
}

/// Counts of impacts resolved in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactCount {
    /// Body-body impacts.
    pub pairs: usize,
    /// Body-wall impacts.
    pub walls: usize,
}

/// Resolves all contacts of a body set with a fixed restitution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionResolver {
    restitution: f64,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl CollisionResolver {
    /// Create a resolver; restitution is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(restitution: f64) -> Self {
        Self {
            restitution: clamp_restitution(restitution),
        }
    }

    /// Restitution coefficient in use.
    #[must_use]
    pub const fn restitution(&self) -> f64 {
        self.restitution
    }

    /// Resolve one pair if it is in contact and closing. Returns whether an
    /// impulse was applied.
    pub fn resolve_pair(&self, a: &mut Body, b: &mut Body) -> bool {
        if !in_contact(a, b) || !is_closing(a, b) {
            return false;
        }
        let (va, vb) = resolve(a, b, self.restitution);
        a.velocity = va;
        b.velocity = vb;
        true
    }

    /// Resolve every contact once: pairs in ascending `(i, j)` order, then
    /// walls in body order.
    ///
    /// Simultaneous contacts are handled pairwise with no global solve, so a
    /// later pair sees the velocities produced by earlier ones.
    pub fn resolve_all(&self, bodies: &mut [Body], container: Option<&Container>) -> ImpactCount {
        let mut count = ImpactCount::default();
        let n = bodies.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = bodies.split_at_mut(j);
                if self.resolve_pair(&mut head[i], &mut tail[0]) {
                    count.pairs += 1;
                }
            }
        }

        if let Some(container) = container {
            for body in bodies.iter_mut() {
                if let Some(v) = resolve_boundary(body, container, self.restitution) {
                    body.velocity = v;
                    count.walls += 1;
                }
            }
        }

        count
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::state::{total_kinetic_energy, total_momentum};

    fn head_on() -> (Body, Body) {
        (
            Body::new(1.0, 0.5, Vec2::new(-0.4, 0.0), Vec2::new(2.0, 0.0)),
            Body::new(2.0, 0.5, Vec2::new(0.4, 0.0), Vec2::new(-1.0, 0.0)),
        )
    }

    fn apply(a: &Body, b: &Body, e: f64) -> [Body; 2] {
        let (va, vb) = resolve(a, b, e);
        [
            Body { velocity: va, ..*a },
            Body { velocity: vb, ..*b },
        ]
    }

    #[test]
    fn test_contact_and_closing() {
        let (a, b) = head_on();
        assert!(in_contact(&a, &b));
        assert!(is_closing(&a, &b));

        let separating = Body {
            velocity: Vec2::new(3.0, 0.0),
            ..b
        };
        assert!(!is_closing(&a, &separating));

        let far = Body {
            position: Vec2::new(5.0, 0.0),
            ..b
        };
        assert!(!in_contact(&a, &far));
    }

    #[test]
    fn test_touching_counts_as_contact() {
        let a = Body::new(1.0, 1.0, Vec2::new(0.0, 0.0), Vec2::zero());
        let b = Body::new(1.0, 1.0, Vec2::new(2.0, 0.0), Vec2::zero());
        assert!(in_contact(&a, &b));
    }

    #[test]
    fn test_momentum_zero_for_any_restitution() {
        let (a, b) = head_on();
        let before = [a, b];
        assert!(total_momentum(&before).magnitude() < 1e-12);

        for e in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let after = apply(&a, &b, e);
            assert!(
                total_momentum(&after).magnitude() < 1e-12,
                "e = {e}: {:?}",
                total_momentum(&after)
            );
        }
    }

    #[test]
    fn test_energy_preserved_only_when_elastic() {
        let (a, b) = head_on();
        let ke_before = total_kinetic_energy(&[a, b]);

        let elastic = apply(&a, &b, 1.0);
        assert!((total_kinetic_energy(&elastic) - ke_before).abs() < 1e-12);

        for e in [0.0, 0.3, 0.9, 0.999] {
            let after = apply(&a, &b, e);
            assert!(total_kinetic_energy(&after) < ke_before, "e = {e}");
        }
    }

    #[test]
    fn test_elastic_head_on_values() {
        let (a, b) = head_on();
        let (va, vb) = resolve(&a, &b, 1.0);
        // ((1-2)·2 + 2·2·(-1))/3 = -2, ((2-1)·(-1) + 2·1·2)/3 = 1
        assert!((va.x + 2.0).abs() < 1e-12);
        assert!((vb.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfectly_inelastic_moves_together() {
        let (a, b) = head_on();
        let (va, vb) = resolve(&a, &b, 0.0);
        assert!((va - vb).magnitude() < 1e-12);
    }

    #[test]
    fn test_tangential_component_unchanged() {
        let a = Body::new(1.0, 0.5, Vec2::new(0.0, 0.0), Vec2::new(1.0, 3.0));
        let b = Body::new(1.0, 0.5, Vec2::new(0.9, 0.0), Vec2::new(-1.0, -2.0));
        let (va, vb) = resolve(&a, &b, 1.0);
        assert!((va.y - 3.0).abs() < 1e-12);
        assert!((vb.y + 2.0).abs() < 1e-12);
        // equal masses, elastic: normal components swap
        assert!((va.x + 1.0).abs() < 1e-12);
        assert!((vb.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_coincident_centres_pass_through() {
        let a = Body::new(1.0, 0.5, Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0));
        let b = Body::new(1.0, 0.5, Vec2::new(1.0, 1.0), Vec2::new(-1.0, 0.0));
        let (va, vb) = resolve(&a, &b, 1.0);
        assert_eq!(va, a.velocity);
        assert_eq!(vb, b.velocity);
    }

    #[test]
    fn test_restitution_is_clamped() {
        assert!((clamp_restitution(1.5) - 1.0).abs() < f64::EPSILON);
        assert!(clamp_restitution(-0.5).abs() < f64::EPSILON);
        assert!((clamp_restitution(f64::NAN) - 1.0).abs() < f64::EPSILON);
        assert!((CollisionResolver::new(7.0).restitution() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_reflects_and_scales() {
        let container = Container::new(10.0, 10.0);
        let body = Body::new(1.0, 1.0, Vec2::new(0.5, 5.0), Vec2::new(-4.0, 1.0));
        let v = resolve_boundary(&body, &container, 0.5).expect("wall hit");
        assert!((v.x - 2.0).abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_ignores_separating_body() {
        let container = Container::new(10.0, 10.0);
        let body = Body::new(1.0, 1.0, Vec2::new(0.5, 5.0), Vec2::new(4.0, 0.0));
        assert!(resolve_boundary(&body, &container, 1.0).is_none());
    }

    #[test]
    fn test_boundary_corner_hits_both_axes() {
        let container = Container::new(10.0, 10.0);
        let body = Body::new(1.0, 1.0, Vec2::new(9.5, 9.5), Vec2::new(1.0, 2.0));
        let v = resolve_boundary(&body, &container, 1.0).expect("corner hit");
        assert_eq!(v, Vec2::new(-1.0, -2.0));
    }

    #[test]
    fn test_resolve_pair_skips_separating() {
        let resolver = CollisionResolver::new(1.0);
        let (mut a, mut b) = head_on();
        assert!(resolver.resolve_pair(&mut a, &mut b));
        // now separating: a second pass must not flip them back
        assert!(!resolver.resolve_pair(&mut a, &mut b));
    }

    #[test]
    fn test_resolve_all_order_is_deterministic() {
        let resolver = CollisionResolver::new(0.8);
        let bodies = vec![
            Body::new(1.0, 0.5, Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)),
            Body::new(1.0, 0.5, Vec2::new(0.9, 0.0), Vec2::new(0.0, 0.0)),
            Body::new(1.0, 0.5, Vec2::new(1.8, 0.0), Vec2::new(-1.0, 0.0)),
        ];
        let mut first = bodies.clone();
        let mut second = bodies;
        let c1 = resolver.resolve_all(&mut first, None);
        let c2 = resolver.resolve_all(&mut second, None);
        assert_eq!(first, second);
        assert_eq!(c1, c2);
        assert!(c1.pairs >= 1);
    }

    #[test]
    fn test_overlap_is_not_corrected() {
        let resolver = CollisionResolver::new(1.0);
        let (a, b) = head_on();
        let mut bodies = [a, b];
        resolver.resolve_all(&mut bodies, None);
        assert_eq!(bodies[0].position, a.position);
        assert_eq!(bodies[1].position, b.position);
    }
}
