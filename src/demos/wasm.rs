//! Browser bindings.
//!
//! Wraps a one-experiment frame scheduler for JavaScript. The page calls
//! `refresh` from `requestAnimationFrame` and draws the returned JSON frame
//! on its own canvas.
//!
//! ```javascript
//! import init, { WasmLab } from './simlab.js';
//!
//! await init();
//! const lab = WasmLab.preset("orbital-three-body");
//! let last = performance.now();
//! function tick(now) {
//!     const frame = JSON.parse(lab.refresh(now - last));
//!     last = now;
//!     draw(frame);
//!     requestAnimationFrame(tick);
//! }
//! requestAnimationFrame(tick);
//! ```

#![allow(clippy::must_use_candidate)]

use wasm_bindgen::prelude::*;

use crate::config::{ExperimentConfig, LabConfig};
use crate::engine::{refresh_interval, FrameScheduler, RegistrationId};
use crate::error::SimError;
use crate::renderers::RecordingRenderer;

fn js_error(e: &SimError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-exported lab running one experiment.
#[wasm_bindgen]
pub struct WasmLab {
    scheduler: FrameScheduler,
    recorder: RecordingRenderer,
    id: RegistrationId,
}

#[wasm_bindgen]
impl WasmLab {
    /// Create a lab from a YAML lab file.
    #[wasm_bindgen(js_name = fromYaml)]
    pub fn from_yaml(yaml: &str) -> Result<WasmLab, JsValue> {
        let lab = LabConfig::from_yaml(yaml).map_err(|e| js_error(&e))?;
        Ok(Self::from_lab(&lab))
    }

    /// Create a lab running a named preset.
    #[wasm_bindgen]
    pub fn preset(name: &str) -> Result<WasmLab, JsValue> {
        let config = super::preset(name).map_err(|e| js_error(&e))?;
        Ok(Self::from_lab(&LabConfig::new(config)))
    }

    /// Advance by one display refresh and return the new frame as JSON.
    ///
    /// Intervals longer than a second (a backgrounded tab) count as one
    /// second.
    #[wasm_bindgen]
    pub fn refresh(&mut self, elapsed_ms: f64) -> Result<String, JsValue> {
        self.scheduler.on_refresh(refresh_interval(elapsed_ms / 1000.0));
        self.frame_json()
    }

    /// Latest frame as JSON.
    #[wasm_bindgen(js_name = frameJson)]
    pub fn frame_json(&self) -> Result<String, JsValue> {
        let frame = self
            .recorder
            .last()
            .ok_or_else(|| JsValue::from_str("no frame rendered"))?;
        frame.to_json().map_err(|e| js_error(&e))
    }

    /// Current diagnostics as JSON.
    #[wasm_bindgen(js_name = diagnosticsJson)]
    pub fn diagnostics_json(&self) -> Result<String, JsValue> {
        let experiment = self.scheduler.experiment(self.id).map_err(|e| js_error(&e))?;
        serde_json::to_string(&experiment.diagnostics())
            .map_err(|e| js_error(&SimError::from(e)))
    }

    /// Apply an experiment config given as YAML.
    #[wasm_bindgen]
    pub fn configure(&mut self, yaml: &str) -> Result<(), JsValue> {
        let config = ExperimentConfig::from_yaml(yaml).map_err(|e| js_error(&e))?;
        self.scheduler.configure(self.id, config).map_err(|e| js_error(&e))
    }

    /// Pause stepping.
    #[wasm_bindgen]
    pub fn pause(&mut self) -> Result<(), JsValue> {
        self.scheduler.pause(self.id).map_err(|e| js_error(&e))
    }

    /// Resume stepping.
    #[wasm_bindgen]
    pub fn resume(&mut self) -> Result<(), JsValue> {
        self.scheduler.resume(self.id).map_err(|e| js_error(&e))
    }

    /// Restore the initial state.
    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.scheduler.reset(self.id).map_err(|e| js_error(&e))
    }

    /// Simulated time in seconds.
    #[wasm_bindgen(getter)]
    pub fn time(&self) -> f64 {
        self.scheduler
            .experiment(self.id)
            .map_or(0.0, |experiment| experiment.time())
    }
}

impl WasmLab {
    fn from_lab(lab: &LabConfig) -> Self {
        let mut scheduler = FrameScheduler::new(lab.scheduler.clone());
        let recorder = RecordingRenderer::with_capacity(1);
        let id = scheduler.register(super::build(lab.experiment.clone()), Box::new(recorder.clone()));
        Self {
            scheduler,
            recorder,
            id,
        }
    }
}
