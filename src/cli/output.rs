//! CLI output formatting.

use super::commands::{experiment_label, FrameRecord};
use crate::config::ExperimentConfig;
use crate::demos;

/// Print version information.
pub fn print_version() {
    println!("simlab {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message.
pub fn print_help() {
    println!(
        r"simlab - Real-time physics experiments

USAGE:
    simlab <COMMAND> [OPTIONS]

COMMANDS:
    run <lab.yaml>              Run the experiment in a lab file
        -n, --frames <N>        Display refreshes to simulate (default: 300)
        --hz <H>                Simulated refresh rate, 1 to 1000 (default: 60)
        --json                  Print one JSON record per frame
        --strict                Stop with exit code 2 on a non-finite state

    preset <name>               Run a built-in preset (same options as run)

    presets                     List built-in presets

    validate <lab.yaml>         Check a lab file without running it

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    simlab run labs/pendulum.yaml --frames 600
    simlab preset orbital-three-body --json
    simlab validate labs/billiards.yaml

Set RUST_LOG=debug for scheduler logging.
"
    );
}

/// Print the preset names, grouped by experiment.
pub fn print_presets() {
    println!("Presets:");
    for (name, config) in demos::presets() {
        println!("  {name:<24} {}", config.kind());
    }
}

/// One-line text summary of a frame.
#[must_use]
pub fn format_frame_summary(record: &FrameRecord) -> String {
    let d = &record.diagnostics;
    let mut line = format!("frame {:>5}  t={:>8.3}s", record.frame, d.time);
    if let Some(e) = d.total_energy.or(d.kinetic_energy) {
        line.push_str(&format!("  E={e:>12.6}"));
    }
    if let Some(p) = d.momentum {
        line.push_str(&format!("  p=({:.3e}, {:.3e})", p.x, p.y));
    }
    if let Some(period) = d.period {
        line.push_str(&format!("  T={period:.4}s"));
    }
    if let Some(impacts) = d.impacts {
        line.push_str(&format!("  impacts={impacts}"));
    }
    line.push_str(&format!("  cmds={}", record.render.commands.len()));
    line
}

/// Print a frame summary.
pub fn print_frame_summary(record: &FrameRecord) {
    println!("{}", format_frame_summary(record));
}

/// Print the closing line of a text run, given its final frame.
pub fn print_run_footer(config: &ExperimentConfig, last: Option<&FrameRecord>) {
    let label = experiment_label(config);
    match last {
        Some(last) => println!(
            "━━━ {label}: {} frames, t={:.3}s, {} steps",
            last.frame, last.diagnostics.time, last.diagnostics.steps
        ),
        None => println!("━━━ {label}: no frames"),
    }
}
