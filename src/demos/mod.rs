//! Interactive experiments.
//!
//! Each experiment owns the state of one simulation, advances it by one
//! frame in [`Experiment::step`], and describes what to draw in
//! [`Experiment::render`]. The scheduler drives experiments only through this
//! trait, so it never needs to know which model is running.
//!
//! # Experiments
//!
//! 1. [`pendulum`] - damped simple pendulum
//! 2. [`orbital`] - gravitating N-body system with trails
//! 3. [`collision`] - discs in a box with restitution
//! 4. [`wave`] - travelling closed-form waveforms

pub mod collision;
pub mod orbital;
pub mod pendulum;
pub mod wave;

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::{Deserialize, Serialize};

use crate::config::ExperimentConfig;
use crate::engine::state::Vec2;
use crate::error::SimResult;
use crate::renderers::RenderFrame;

pub use collision::{CollisionConfig, CollisionExperiment};
pub use orbital::{BodyConfig, OrbitalConfig, OrbitalExperiment};
pub use pendulum::{PendulumConfig, PendulumExperiment};
pub use wave::{WaveConfig, WaveExperiment};

/// Which model an experiment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentKind {
    Pendulum,
    Orbital,
    Collision,
    Wave,
}

impl ExperimentKind {
    /// All kinds in display order.
    pub const ALL: [Self; 4] = [Self::Pendulum, Self::Orbital, Self::Collision, Self::Wave];

    /// Lowercase name, as used in YAML.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pendulum => "pendulum",
            Self::Orbital => "orbital",
            Self::Collision => "collision",
            Self::Wave => "wave",
        }
    }
}

impl std::fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ExperimentKind {
    type Err = crate::error::SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::error::SimError::UnknownExperiment(s.to_string()))
    }
}

/// Physical summary of an experiment's current state.
///
/// Fields that do not apply to a model are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Simulation time (s).
    pub time: f64,
    /// Steps taken since the last reset.
    pub steps: u64,
    /// Kinetic energy.
    pub kinetic_energy: Option<f64>,
    /// Potential energy.
    pub potential_energy: Option<f64>,
    /// Kinetic plus potential energy.
    pub total_energy: Option<f64>,
    /// Total linear momentum.
    pub momentum: Option<Vec2>,
    /// Centre of mass.
    pub center_of_mass: Option<Vec2>,
    /// Measured oscillation period.
    pub period: Option<f64>,
    /// Impacts resolved since the last reset.
    pub impacts: Option<u64>,
}

/// A simulation the frame scheduler can drive.
pub trait Experiment {
    /// Display name.
    fn name(&self) -> &str;

    /// Model run by this experiment.
    fn kind(&self) -> ExperimentKind;

    /// Advance by one frame of `dt` seconds. `dt` is clamped by the model.
    fn step(&mut self, dt: f64);

    /// Discard the current state and rebuild it from the current configuration.
    fn reset(&mut self);

    /// Snapshot of the current configuration.
    fn config(&self) -> ExperimentConfig;

    /// Apply a new configuration snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SimError::KindMismatch` if `config` is for another model.
    fn configure(&mut self, config: ExperimentConfig) -> SimResult<()>;

    /// Describe the current state as drawing primitives.
    fn render(&self) -> RenderFrame;

    /// Physical summary of the current state.
    fn diagnostics(&self) -> Diagnostics;

    /// Whether every state variable is finite.
    fn is_finite(&self) -> bool;

    /// Simulation time since the last reset (s).
    fn time(&self) -> f64;
}

/// Build the experiment described by `config`.
#[must_use]
pub fn build(config: ExperimentConfig) -> Box<dyn Experiment> {
    match config {
        ExperimentConfig::Pendulum(c) => Box::new(PendulumExperiment::new(c)),
        ExperimentConfig::Orbital(c) => Box::new(OrbitalExperiment::new(c)),
        ExperimentConfig::Collision(c) => Box::new(CollisionExperiment::new(c)),
        ExperimentConfig::Wave(c) => Box::new(WaveExperiment::new(c)),
    }
}

/// Named preset configurations, as `(name, config)` pairs.
#[must_use]
pub fn presets() -> Vec<(&'static str, ExperimentConfig)> {
    let mut all = vec![
        ("pendulum", ExperimentConfig::Pendulum(PendulumConfig::default())),
        ("pendulum-small-angle", ExperimentConfig::Pendulum(PendulumConfig::small_angle())),
        ("pendulum-damped", ExperimentConfig::Pendulum(PendulumConfig::damped())),
        ("orbital", ExperimentConfig::Orbital(OrbitalConfig::default())),
        ("orbital-two-body", ExperimentConfig::Orbital(OrbitalConfig::two_body_circular())),
        ("orbital-three-body", ExperimentConfig::Orbital(OrbitalConfig::three_body())),
        ("collision", ExperimentConfig::Collision(CollisionConfig::default())),
        ("collision-head-on", ExperimentConfig::Collision(CollisionConfig::head_on())),
        ("collision-billiards", ExperimentConfig::Collision(CollisionConfig::billiards())),
        ("wave", ExperimentConfig::Wave(WaveConfig::default())),
    ];
    all.extend(
        crate::domains::WaveShape::ALL
            .into_iter()
            .map(|shape| (wave::preset_name(shape), ExperimentConfig::Wave(WaveConfig::with_shape(shape)))),
    );
    all
}

/// Look up a preset by name.
///
/// # Errors
///
/// Returns `SimError::UnknownExperiment` if no preset has that name.
pub fn preset(name: &str) -> SimResult<ExperimentConfig> {
    presets()
        .into_iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, c)| c)
        .ok_or_else(|| crate::error::SimError::UnknownExperiment(name.to_string()))
}

/// `SimError::KindMismatch` for `config` sent to an experiment of `expected` kind.
pub(crate) fn kind_mismatch(expected: ExperimentKind, config: &ExperimentConfig) -> crate::error::SimError {
    crate::error::SimError::KindMismatch {
        expected: expected.name().to_string(),
        actual: config.kind().name().to_string(),
    }
}
