//! CLI command handlers.
//!
//! Every run goes through the frame scheduler with a recording renderer, the
//! same path an interactive front end takes.

use std::path::Path;
use std::process::ExitCode;

use serde::{Deserialize, Serialize};

use super::output::{print_frame_summary, print_help, print_presets, print_run_footer, print_version};
use super::args::clamp_refresh_hz;
use super::{Args, Command, RunOptions};
use crate::config::{ExperimentConfig, LabConfig};
use crate::demos::{self, Diagnostics};
use crate::engine::{refresh_interval, FrameScheduler};
use crate::error::{SimError, SimResult};
use crate::renderers::{RecordingRenderer, RenderFrame};

/// One refresh of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Refresh index, starting at 1.
    pub frame: u64,
    /// Physical summary after the refresh.
    pub diagnostics: Diagnostics,
    /// Frame handed to the renderer.
    pub render: RenderFrame,
}

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run { lab_path, options } => run_lab_file(&lab_path, &options),
        Command::Preset { name, options } => run_preset(&name, &options),
        Command::ListPresets => {
            print_presets();
            ExitCode::SUCCESS
        }
        Command::Validate { lab_path } => validate_lab_file(&lab_path),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Run a lab file and print each frame.
#[must_use]
pub fn run_lab_file(path: &Path, options: &RunOptions) -> ExitCode {
    match LabConfig::load(path) {
        Ok(lab) => report(&lab, options),
        Err(e) => {
            eprintln!("Error: {}: {e}", path.display());
            ExitCode::from(1)
        }
    }
}

/// Run a named preset with default scheduler settings.
#[must_use]
pub fn run_preset(name: &str, options: &RunOptions) -> ExitCode {
    match demos::preset(name) {
        Ok(config) => report(&LabConfig::new(config), options),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Check a lab file and print the experiment it describes.
#[must_use]
pub fn validate_lab_file(path: &Path) -> ExitCode {
    match LabConfig::load(path) {
        Ok(lab) => {
            println!("✓ {}: {} experiment", path.display(), lab.experiment.kind());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}: {e}", path.display());
            ExitCode::from(1)
        }
    }
}

fn report(lab: &LabConfig, options: &RunOptions) -> ExitCode {
    let mut last = None;
    let result = run_frames(lab, options, |record| {
        if options.json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            print_frame_summary(&record);
        }
        last = Some(record);
        Ok(())
    });
    match result {
        Ok(_) => {
            if !options.json {
                print_run_footer(&lab.experiment, last.as_ref());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code(&e)
        }
    }
}

/// Exit status for a failed run: 2 for a numerical fault, 1 otherwise.
#[must_use]
pub fn exit_code(error: &SimError) -> ExitCode {
    if error.is_numerical_fault() {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

/// Run `lab` headlessly for `options.frames` refreshes at `options.refresh_hz`
/// and collect every frame.
///
/// # Errors
///
/// See [`run_frames`].
pub fn simulate(lab: &LabConfig, options: &RunOptions) -> SimResult<Vec<FrameRecord>> {
    let mut records = Vec::new();
    run_frames(lab, options, |record| {
        records.push(record);
        Ok(())
    })?;
    Ok(records)
}

/// Run `lab` headlessly, handing each frame to `sink` as soon as it is
/// rendered. Returns the number of frames delivered.
///
/// # Errors
///
/// Returns the first error from `sink`, which ends the run. With
/// `options.strict`, returns `SimError::NonFiniteValue` at the first
/// refresh that needed a Jidoka recovery.
pub fn run_frames<F>(lab: &LabConfig, options: &RunOptions, mut sink: F) -> SimResult<u64>
where
    F: FnMut(FrameRecord) -> SimResult<()>,
{
    let hz = clamp_refresh_hz(options.refresh_hz);
    let refresh = refresh_interval(1.0 / hz);

    let mut scheduler = FrameScheduler::new(lab.scheduler.clone());
    let recorder = RecordingRenderer::with_capacity(1);
    let id = scheduler.register(demos::build(lab.experiment.clone()), Box::new(recorder.clone()));
    log::debug!(
        "running {} for {} frames at {hz} Hz",
        lab.experiment.kind(),
        options.frames
    );

    let mut delivered = 0;
    for frame in 1..=options.frames {
        scheduler.on_refresh(refresh);
        if options.strict {
            scheduler.check_health(id)?;
        }
        let diagnostics = scheduler.experiment(id)?.diagnostics();
        if let Some(render) = recorder.last() {
            sink(FrameRecord {
                frame,
                diagnostics,
                render,
            })?;
            delivered += 1;
        }
    }

    scheduler.unregister(id)?;
    Ok(delivered)
}

/// Name of the experiment a config builds, for display.
#[must_use]
pub fn experiment_label(config: &ExperimentConfig) -> String {
    demos::build(config.clone()).name().to_string()
}
