//! Travelling waveform experiment.
//!
//! The waveform has no dynamical state: each frame advances the clock and
//! resamples the closed-form curve across the visible width.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{kind_mismatch, Diagnostics, Experiment, ExperimentKind};
use crate::config::ExperimentConfig;
use crate::domains::clamp_timestep;
use crate::domains::wave::{sample_curve, WaveParams, WaveShape};
use crate::error::SimResult;
use crate::renderers::{Bounds, Color, RenderCommand, RenderFrame};

/// Waveform parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WaveConfig {
    /// Peak displacement A.
    pub amplitude: f64,
    /// Cycles across the visible width and per second.
    pub frequency: f64,
    /// Waveform shape.
    pub shape: WaveShape,
    /// Spatial attenuation d in [0, 1).
    pub damping: f64,
    /// Width of the sampled range.
    pub visible_width: f64,
    /// Points per drawn curve.
    #[validate(range(min = 2, max = 4096))]
    pub samples: usize,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            amplitude: 80.0,
            frequency: 2.0,
            shape: WaveShape::Sine,
            damping: 0.0,
            visible_width: 800.0,
            samples: 200,
        }
    }
}

impl WaveConfig {
    /// Default parameters with another shape.
    #[must_use]
    pub fn with_shape(shape: WaveShape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    /// Set the frequency.
    #[must_use]
    pub const fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the damping.
    #[must_use]
    pub const fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Clamped evaluator parameters.
    #[must_use]
    pub fn params(&self) -> WaveParams {
        WaveParams::new(self.amplitude, self.frequency, self.shape, self.damping)
    }

    fn width(&self) -> f64 {
        if self.visible_width.is_finite() && self.visible_width > 0.0 {
            self.visible_width
        } else {
            WaveConfig::default().visible_width
        }
    }
}

/// Preset name for a wave shape.
#[must_use]
pub const fn preset_name(shape: WaveShape) -> &'static str {
    match shape {
        WaveShape::Sine => "wave-sine",
        WaveShape::Square => "wave-square",
        WaveShape::Triangle => "wave-triangle",
        WaveShape::Sawtooth => "wave-sawtooth",
    }
}

/// Animated waveform.
#[derive(Debug, Clone)]
pub struct WaveExperiment {
    config: WaveConfig,
    time: f64,
    steps: u64,
}

impl Default for WaveExperiment {
    fn default() -> Self {
        Self::new(WaveConfig::default())
    }
}

impl WaveExperiment {
    /// Create the experiment at time zero.
    #[must_use]
    pub const fn new(config: WaveConfig) -> Self {
        Self {
            config,
            time: 0.0,
            steps: 0,
        }
    }

    /// Current sampled curve.
    #[must_use]
    pub fn curve(&self) -> Vec<(f64, f64)> {
        sample_curve(&self.config.params(), self.time, self.config.width(), self.config.samples)
    }
}

impl Experiment for WaveExperiment {
    fn name(&self) -> &str {
        "Waveforms"
    }

    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Wave
    }

    fn step(&mut self, dt: f64) {
        self.time += clamp_timestep(dt);
        self.steps += 1;
    }

    fn reset(&mut self) {
        self.time = 0.0;
        self.steps = 0;
    }

    fn config(&self) -> ExperimentConfig {
        ExperimentConfig::Wave(self.config.clone())
    }

    fn configure(&mut self, config: ExperimentConfig) -> SimResult<()> {
        match config {
            ExperimentConfig::Wave(c) => {
                self.config = c;
                Ok(())
            }
            other => Err(kind_mismatch(self.kind(), &other)),
        }
    }

    fn render(&self) -> RenderFrame {
        let width = self.config.width();
        let extent = self.config.params().amplitude.max(1.0) * 1.2;
        let mut frame = RenderFrame::new(self.name(), self.time, Bounds::new(0.0, width, -extent, extent));

        frame.push(RenderCommand::Clear { color: Color::BLACK });
        frame.push(RenderCommand::Line {
            x1: 0.0,
            y1: 0.0,
            x2: width,
            y2: 0.0,
            color: Color::GREY,
        });
        frame.push(RenderCommand::Polyline {
            points: self.curve(),
            color: Color::BLUE,
        });
        frame.push(RenderCommand::Text {
            x: 0.0,
            y: extent,
            text: format!("{} {:.2} Hz", self.config.shape, self.config.params().frequency),
            color: Color::WHITE,
        });
        frame
    }

    fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            time: self.time,
            steps: self.steps,
            ..Diagnostics::default()
        }
    }

    fn is_finite(&self) -> bool {
        self.time.is_finite()
    }

    fn time(&self) -> f64 {
        self.time
    }
}
