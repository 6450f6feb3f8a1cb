//! # simlab
//!
//! Real-time simulation core for interactive science demonstrations.
//!
//! Four experiments share one frame engine:
//! - Damped simple pendulum
//! - Gravitational N-body orbits with trails
//! - Elastic and inelastic disc collisions in a box
//! - Travelling sine, square, triangle and sawtooth waves
//!
//! Each experiment is registered with a [`FrameScheduler`] together with a
//! renderer. On every display refresh the scheduler advances running
//! experiments, recovers any that produce non-finite state (Jidoka), and
//! hands each renderer a backend-neutral [`renderers::RenderFrame`].
//!
//! ## Example
//!
//! ```rust
//! use simlab::prelude::*;
//! use std::time::Duration;
//!
//! let mut scheduler = FrameScheduler::default();
//! let recorder = RecordingRenderer::new();
//! let experiment = build(ExperimentConfig::Pendulum(PendulumConfig::default()));
//! let id = scheduler.register(experiment, Box::new(recorder.clone()));
//!
//! scheduler.on_refresh(Duration::from_millis(16));
//! assert!(scheduler.experiment(id).is_ok());
//! assert_eq!(recorder.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Physics formulas are written as derived
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
)]

pub mod cli;
pub mod config;
pub mod demos;
pub mod domains;
pub mod engine;
pub mod error;
pub mod renderers;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ExperimentConfig, LabConfig, SchedulerConfig, TimestepMode};
    pub use crate::demos::{
        build, preset, CollisionConfig, Diagnostics, Experiment, ExperimentKind, OrbitalConfig,
        PendulumConfig, WaveConfig,
    };
    pub use crate::domains::{clamp_timestep, WaveShape};
    pub use crate::engine::{Body, FrameScheduler, JidokaGuard, RegistrationId, SimTime, Vec2};
    pub use crate::error::{SimError, SimResult};
    pub use crate::renderers::{RecordingRenderer, RenderCommand, RenderFrame, Renderer};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
