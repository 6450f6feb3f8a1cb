//! Closed-form periodic waveforms.
//!
//! # Governing Equations
//!
//! With phase `φ = 2π·x/λ − 2π·f·t`:
//!
//! ```text
//! sine:     A · sin(φ)
//! square:   A · sign(sin(φ))
//! triangle: A · (2/π) · asin(sin(φ))
//! sawtooth: A · ((φ mod 2π)/π − 1)
//! ```
//!
//! each multiplied by the spatial attenuation `max(0, 1 − d·x/W)` where `W`
//! is the visible width. The evaluator holds no state between samples.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Upper bound for the damping coefficient; `d` lives in `[0, 1)`.
pub const MAX_DAMPING: f64 = 0.999;

/// Most points [`sample_curve`] will produce.
pub const MAX_SAMPLES: usize = 4096;

/// Waveform shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveShape {
    /// Smooth sinusoid.
    #[default]
    Sine,
    /// ±A with zero at the crossings.
    Square,
    /// Piecewise-linear between ±A.
    Triangle,
    /// Linear ramp from −A to A per period.
    Sawtooth,
}

impl WaveShape {
    /// All shapes in display order.
    pub const ALL: [Self; 4] = [Self::Sine, Self::Square, Self::Triangle, Self::Sawtooth];

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Sawtooth => "sawtooth",
        }
    }

    /// Unit-amplitude value at phase `phi`.
    #[must_use]
    pub fn unit(self, phi: f64) -> f64 {
        match self {
            Self::Sine => phi.sin(),
            Self::Square => sign(phi.sin()),
            Self::Triangle => (2.0 / PI) * phi.sin().asin(),
            Self::Sawtooth => phi.rem_euclid(TAU) / PI - 1.0,
        }
    }
}

impl std::fmt::Display for WaveShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of one waveform evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    /// Peak displacement (≥ 0).
    pub amplitude: f64,
    /// Cycles across the visible width, and per second when animated (≥ 0).
    pub frequency: f64,
    /// Shape.
    pub shape: WaveShape,
    /// Spatial attenuation in `[0, 1)`.
    pub damping: f64,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude: 80.0,
            frequency: 1.0,
            shape: WaveShape::Sine,
            damping: 0.0,
        }
    }
}

impl WaveParams {
    /// Create parameters with amplitude, frequency and damping clamped into range.
    #[must_use]
    pub fn new(amplitude: f64, frequency: f64, shape: WaveShape, damping: f64) -> Self {
        Self {
            amplitude: non_negative(amplitude),
            frequency: non_negative(frequency),
            shape,
            damping: non_negative(damping).min(MAX_DAMPING),
        }
    }

    /// Copy of these parameters with every field clamped.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self::new(self.amplitude, self.frequency, self.shape, self.damping)
    }
}

/// Wavelength that fits `frequency` cycles into `visible_width`.
///
/// Returns infinity for zero frequency; `evaluate` treats that as a flat line.
#[must_use]
pub fn wavelength_for(visible_width: f64, frequency: f64) -> f64 {
    if frequency > 0.0 && frequency.is_finite() {
        visible_width / frequency
    } else {
        f64::INFINITY
    }
}

/// Linear spatial attenuation `max(0, 1 − d·x/W)`.
#[must_use]
pub fn damping_factor(position: f64, damping: f64, visible_width: f64) -> f64 {
    if !(visible_width > 0.0 && visible_width.is_finite()) {
        return 1.0;
    }
    let d = non_negative(damping).min(MAX_DAMPING);
    (1.0 - d * position / visible_width).max(0.0)
}

/// Displacement at `position` for a stationary wave.
#[must_use]
pub fn evaluate(position: f64, params: &WaveParams, wavelength: f64, visible_width: f64) -> f64 {
    evaluate_at(position, 0.0, params, wavelength, visible_width)
}

/// Displacement at `position` and time `time` for a wave travelling in +x.
///
/// Zero frequency, a non-positive wavelength or non-finite input all give a
/// flat line.
#[must_use]
pub fn evaluate_at(
    position: f64,
    time: f64,
    params: &WaveParams,
    wavelength: f64,
    visible_width: f64,
) -> f64 {
    let p = params.clamped();
    if p.frequency <= 0.0 || !(wavelength > 0.0 && wavelength.is_finite()) {
        return 0.0;
    }
    if !position.is_finite() || !time.is_finite() {
        return 0.0;
    }

    let phi = TAU * position / wavelength - TAU * p.frequency * time;
    p.amplitude * p.shape.unit(phi) * damping_factor(position, p.damping, visible_width)
}

/// Sample `samples` evenly spaced points over `[0, width]` at `time`.
///
/// Returns `(x, y)` pairs ready to be drawn as a polyline. The sample count
/// is clamped into `[2, MAX_SAMPLES]` so both ends of the range are present.
#[must_use]
pub fn sample_curve(params: &WaveParams, time: f64, width: f64, samples: usize) -> Vec<(f64, f64)> {
    let width = non_negative(width);
    let samples = samples.clamp(2, MAX_SAMPLES);
    let wavelength = wavelength_for(width, params.frequency);
    let step = width / (samples - 1) as f64;

    (0..samples)
        .map(|i| {
            let x = step * i as f64;
            (x, evaluate_at(x, time, params, wavelength, width))
        })
        .collect()
}

/// Sign with `sign(0) = 0`.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
