//! Platform-agnostic render output.
//!
//! Experiments never draw. Each frame they describe what to draw as a list of
//! [`RenderCommand`]s in world coordinates, and a [`Renderer`] consumes the
//! resulting [`RenderFrame`] (canvas, terminal, or a recorder in tests).

pub mod recording;

use serde::{Deserialize, Serialize};

pub use recording::RecordingRenderer;

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const GREY: Self = Self::rgb(128, 128, 128);
    pub const RED: Self = Self::rgb(239, 68, 68);
    pub const BLUE: Self = Self::rgb(59, 130, 246);
    pub const GREEN: Self = Self::rgb(34, 197, 94);
    pub const YELLOW: Self = Self::rgb(250, 204, 21);
    pub const PURPLE: Self = Self::rgb(168, 85, 247);

    /// Palette cycled through for body colors.
    pub const PALETTE: [Self; 5] = [Self::YELLOW, Self::BLUE, Self::RED, Self::GREEN, Self::PURPLE];

    /// Palette color for index `i`.
    #[must_use]
    pub const fn palette(i: usize) -> Self {
        Self::PALETTE[i % Self::PALETTE.len()]
    }
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Clear the surface.
    Clear { color: Color },

    /// Draw a circle (body, bob, pivot).
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        filled: bool,
    },

    /// Draw a line segment (rod, wall, velocity vector).
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
    },

    /// Draw an open polyline (trail, waveform).
    Polyline {
        points: Vec<(f64, f64)>,
        color: Color,
    },

    /// Draw a text label.
    Text {
        x: f64,
        y: f64,
        text: String,
        color: Color,
    },
}

/// Axis-aligned world-space extent of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds from two corners.
    #[must_use]
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: max_x.max(min_x),
            min_y: min_y.min(max_y),
            max_y: max_y.max(min_y),
        }
    }

    /// Square bounds of half-size `extent` centred on the origin.
    #[must_use]
    pub fn centered(extent: f64) -> Self {
        let e = extent.abs();
        Self::new(-e, e, -e, e)
    }

    /// Smallest bounds containing all points, padded by `margin`.
    ///
    /// Non-finite points are skipped. Returns `None` if nothing is left.
    #[must_use]
    pub fn around<I>(points: I, margin: f64) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut acc: Option<Self> = None;
        for (x, y) in points {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            acc = Some(match acc {
                None => Self::new(x, x, y, y),
                Some(b) => Self::new(b.min_x.min(x), b.max_x.max(x), b.min_y.min(y), b.max_y.max(y)),
            });
        }
        acc.map(|b| Self::new(b.min_x - margin, b.max_x + margin, b.min_y - margin, b.max_y + margin))
    }

    /// Width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// Name of the experiment that produced the frame.
    pub experiment: String,
    /// Simulation time at which the frame was taken.
    pub time: f64,
    /// World-space extent to fit on screen.
    pub bounds: Bounds,
    /// Drawing primitives in order.
    pub commands: Vec<RenderCommand>,
}

impl RenderFrame {
    /// Empty frame.
    #[must_use]
    pub fn new(experiment: impl Into<String>, time: f64, bounds: Bounds) -> Self {
        Self {
            experiment: experiment.into(),
            time,
            bounds,
            commands: Vec::new(),
        }
    }

    /// Append a command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Number of circle commands (one per drawn body).
    #[must_use]
    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Circle { .. }))
            .count()
    }

    /// All polylines in the frame.
    #[must_use]
    pub fn polylines(&self) -> Vec<&[(f64, f64)]> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Polyline { points, .. } => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Serialization` if encoding fails.
    pub fn to_json(&self) -> crate::error::SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Consumer of render frames.
pub trait Renderer {
    /// Draw one frame.
    fn render(&mut self, frame: &RenderFrame);
}

/// Renderer that drops every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &RenderFrame) {}
}

impl<F> Renderer for F
where
    F: FnMut(&RenderFrame),
{
    fn render(&mut self, frame: &RenderFrame) {
        self(frame);
    }
}
