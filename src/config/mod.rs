//! Configuration system with YAML schema and validation.
//!
//! A lab file names one experiment and the scheduler settings used to run it:
//!
//! ```yaml
//! schema_version: "1.0"
//! scheduler:
//!   timestep_mode: fixed
//!   nominal_dt: 0.016
//! experiment:
//!   kind: pendulum
//!   length: 2.0
//!   initial_angle_deg: 45
//! ```
//!
//! Validation checks structure only (body counts, sample counts, step
//! bounds). Physical parameters are never rejected; the models clamp them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationErrors};

use crate::demos::{CollisionConfig, ExperimentKind, OrbitalConfig, PendulumConfig, WaveConfig};
use crate::error::{SimError, SimResult};

/// Configuration of any experiment, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExperimentConfig {
    Pendulum(PendulumConfig),
    Orbital(OrbitalConfig),
    Collision(CollisionConfig),
    Wave(WaveConfig),
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::Pendulum(PendulumConfig::default())
    }
}

impl ExperimentConfig {
    /// Model this configuration is for.
    #[must_use]
    pub const fn kind(&self) -> ExperimentKind {
        match self {
            Self::Pendulum(_) => ExperimentKind::Pendulum,
            Self::Orbital(_) => ExperimentKind::Orbital,
            Self::Collision(_) => ExperimentKind::Collision,
            Self::Wave(_) => ExperimentKind::Wave,
        }
    }

    /// Parse and validate an experiment from YAML.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Validate for ExperimentConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Pendulum(c) => c.validate(),
            Self::Orbital(c) => c.validate(),
            Self::Collision(c) => c.validate(),
            Self::Wave(c) => c.validate(),
        }
    }
}

/// How the scheduler turns display refreshes into simulation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestepMode {
    /// Accumulate elapsed time and step in fixed increments of `nominal_dt`.
    #[default]
    Fixed,
    /// Step once per refresh with the measured elapsed time.
    Wall,
}

/// Frame scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Fixed or wall-clock stepping.
    pub timestep_mode: TimestepMode,
    /// Step size in fixed mode (s).
    #[validate(range(min = 0.000_001, max = 0.05))]
    pub nominal_dt: f64,
    /// Smallest step ever taken (s).
    #[validate(range(min = 0.000_001, max = 0.05))]
    pub min_dt: f64,
    /// Largest step ever taken (s).
    #[validate(range(min = 0.000_001, max = 0.05))]
    pub max_dt: f64,
    /// Upper bound on fixed steps per refresh; excess time is dropped.
    #[validate(range(min = 1, max = 1000))]
    pub max_substeps: u32,
    /// Refreshes per FPS log line (0 disables).
    pub fps_window: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timestep_mode: TimestepMode::Fixed,
            nominal_dt: 1.0 / 60.0,
            min_dt: crate::domains::MIN_DT,
            max_dt: crate::domains::MAX_DT,
            max_substeps: 8,
            fps_window: 120,
        }
    }
}

impl SchedulerConfig {
    /// Use wall-clock stepping.
    #[must_use]
    pub const fn wall_clock(mut self) -> Self {
        self.timestep_mode = TimestepMode::Wall;
        self
    }

    /// Set the fixed step.
    #[must_use]
    pub const fn with_nominal_dt(mut self, dt: f64) -> Self {
        self.nominal_dt = dt;
        self
    }

    fn validate_semantic(&self) -> SimResult<()> {
        if self.min_dt > self.max_dt {
            return Err(SimError::config(format!(
                "min_dt ({}) must not exceed max_dt ({})",
                self.min_dt, self.max_dt
            )));
        }
        Ok(())
    }
}

/// Top-level lab file: one experiment plus scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LabConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Scheduler settings.
    #[validate(nested)]
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Experiment to run.
    pub experiment: ExperimentConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for LabConfig {
    fn default() -> Self {
        Self::new(ExperimentConfig::default())
    }
}

impl LabConfig {
    /// Lab running `experiment` with default scheduler settings.
    #[must_use]
    pub fn new(experiment: ExperimentConfig) -> Self {
        Self {
            schema_version: default_schema_version(),
            scheduler: SchedulerConfig::default(),
            experiment,
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;

        config.validate()?;
        config.experiment.validate()?;
        config.scheduler.validate_semantic()?;

        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
