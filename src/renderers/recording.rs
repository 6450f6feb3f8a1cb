//! Renderer that keeps every frame it receives.

use std::cell::RefCell;
use std::rc::Rc;

use super::{RenderFrame, Renderer};

/// Collects frames into a shared buffer.
///
/// Clones share the same buffer, so a caller can hand one clone to the
/// scheduler and inspect the frames through another.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Rc<RefCell<Vec<RenderFrame>>>,
    capacity: Option<usize>,
}

impl RecordingRenderer {
    /// Unbounded recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder that keeps only the latest `capacity` frames.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Rc::new(RefCell::new(Vec::with_capacity(capacity))),
            capacity: Some(capacity),
        }
    }

    /// Number of frames held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Whether no frame has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    /// Copy of the most recent frame.
    #[must_use]
    pub fn last(&self) -> Option<RenderFrame> {
        self.frames.borrow().last().cloned()
    }

    /// Copy of all held frames, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<RenderFrame> {
        self.frames.borrow().clone()
    }

    /// Remove and return all held frames.
    pub fn drain(&self) -> Vec<RenderFrame> {
        std::mem::take(&mut *self.frames.borrow_mut())
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &RenderFrame) {
        let mut frames = self.frames.borrow_mut();
        if let Some(cap) = self.capacity {
            if cap == 0 {
                return;
            }
            if frames.len() >= cap {
                frames.remove(0);
            }
        }
        frames.push(frame.clone());
    }
}
