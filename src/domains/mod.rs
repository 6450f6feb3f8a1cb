//! Physics domains.
//!
//! Provides the numerical kernels each experiment embeds:
//! - Damped pendulum (semi-implicit Euler)
//! - Gravitational N-body (pairwise forces, semi-implicit Euler)
//! - Rigid-disc collisions with restitution
//! - Closed-form waveforms

pub mod collision;
pub mod orbital;
pub mod pendulum;
pub mod wave;

pub use collision::{CollisionResolver, Container};
pub use orbital::{OrbitalIntegrator, OrbitalParams};
pub use pendulum::{PendulumIntegrator, PendulumState};
pub use wave::{WaveParams, WaveShape};

/// Smallest time step any integrator will take (s).
pub const MIN_DT: f64 = 1e-6;

/// Largest time step any integrator will take (s). A frame that arrives
/// later than this is integrated as if only `MAX_DT` had elapsed.
pub const MAX_DT: f64 = 0.05;

/// Clamp a caller-supplied time step into `[MIN_DT, MAX_DT]`.
///
/// NaN maps to `MIN_DT`, so a corrupted frame time stalls for one step
/// instead of poisoning the state.
#[must_use]
pub fn clamp_timestep(dt: f64) -> f64 {
    if dt.is_nan() {
        MIN_DT
    } else {
        dt.clamp(MIN_DT, MAX_DT)
    }
}
