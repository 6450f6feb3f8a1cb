//! CLI module tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::args::{
    clamp_refresh_hz, Args, Command, RunOptions, DEFAULT_FRAMES, DEFAULT_REFRESH_HZ,
    MAX_REFRESH_HZ, MIN_REFRESH_HZ,
};
use super::commands::{exit_code, run_cli, run_frames, simulate, validate_lab_file};
use super::output::format_frame_summary;
use crate::config::{ExperimentConfig, LabConfig};
use crate::demos::PendulumConfig;
use crate::error::SimError;
use std::path::PathBuf;
use std::process::ExitCode;

// ============================================================================
// Args parsing tests
// ============================================================================

#[test]
fn test_parse_no_args_shows_help() {
    let args = Args::parse_from(["simlab"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_help_flags() {
    for flag in ["-h", "--help", "help"] {
        assert_eq!(Args::parse_from(["simlab", flag]).command, Command::Help);
    }
}

#[test]
fn test_parse_version_flags() {
    for flag in ["-V", "--version", "version"] {
        assert_eq!(Args::parse_from(["simlab", flag]).command, Command::Version);
    }
}

#[test]
fn test_parse_unknown_command_shows_help() {
    let args = Args::parse_from(["simlab", "launch"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_run_defaults() {
    let args = Args::parse_from(["simlab", "run", "lab.yaml"]);
    assert_eq!(
        args.command,
        Command::Run {
            lab_path: PathBuf::from("lab.yaml"),
            options: RunOptions::default(),
        }
    );
    assert_eq!(RunOptions::default().frames, DEFAULT_FRAMES);
}

#[test]
fn test_parse_run_without_path_shows_help() {
    let args = Args::parse_from(["simlab", "run"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_run_options() {
    let args = Args::parse_from([
        "simlab", "run", "lab.yaml", "--frames", "42", "--hz", "120", "--json",
    ]);
    let Command::Run { options, .. } = args.command else {
        panic!("expected run command");
    };
    assert_eq!(options.frames, 42);
    assert!((options.refresh_hz - 120.0).abs() < f64::EPSILON);
    assert!(options.json);
}

#[test]
fn test_parse_run_rejects_bad_option_values() {
    let args = Args::parse_from(["simlab", "run", "lab.yaml", "-n", "many", "--hz", "-5"]);
    let Command::Run { options, .. } = args.command else {
        panic!("expected run command");
    };
    assert_eq!(options.frames, DEFAULT_FRAMES);
    assert!((options.refresh_hz - DEFAULT_REFRESH_HZ).abs() < f64::EPSILON);
}

#[test]
fn test_parse_hz_is_clamped_to_supported_range() {
    let cases = [
        ("1e-20", MIN_REFRESH_HZ),
        ("0.25", MIN_REFRESH_HZ),
        ("1e9", MAX_REFRESH_HZ),
    ];
    for (raw, expected) in cases {
        let args = Args::parse_from(["simlab", "preset", "pendulum", "--hz", raw]);
        let Command::Preset { options, .. } = args.command else {
            panic!("expected preset command");
        };
        assert!((options.refresh_hz - expected).abs() < f64::EPSILON, "--hz {raw}");
    }
}

#[test]
fn test_clamp_refresh_hz() {
    assert!((clamp_refresh_hz(144.0) - 144.0).abs() < f64::EPSILON);
    assert!((clamp_refresh_hz(f64::NAN) - DEFAULT_REFRESH_HZ).abs() < f64::EPSILON);
    assert!((clamp_refresh_hz(0.0) - DEFAULT_REFRESH_HZ).abs() < f64::EPSILON);
    assert!((clamp_refresh_hz(f64::MIN_POSITIVE) - MIN_REFRESH_HZ).abs() < f64::EPSILON);
}

#[test]
fn test_parse_strict_flag() {
    let args = Args::parse_from(["simlab", "run", "lab.yaml", "--strict"]);
    let Command::Run { options, .. } = args.command else {
        panic!("expected run command");
    };
    assert!(options.strict);
    assert!(!RunOptions::default().strict);
}

#[test]
fn test_parse_preset() {
    let args = Args::parse_from(["simlab", "preset", "wave-square", "--json"]);
    let Command::Preset { name, options } = args.command else {
        panic!("expected preset command");
    };
    assert_eq!(name, "wave-square");
    assert!(options.json);
}

#[test]
fn test_parse_presets_and_validate() {
    assert_eq!(Args::parse_from(["simlab", "presets"]).command, Command::ListPresets);
    assert_eq!(
        Args::parse_from(["simlab", "validate", "a.yaml"]).command,
        Command::Validate {
            lab_path: PathBuf::from("a.yaml")
        }
    );
}

// ============================================================================
// Command tests
// ============================================================================

fn options(frames: u64) -> RunOptions {
    RunOptions {
        frames,
        ..RunOptions::default()
    }
}

#[test]
fn test_simulate_records_every_frame() {
    let lab = LabConfig::new(ExperimentConfig::Pendulum(PendulumConfig::default()));
    let records = simulate(&lab, &options(30)).unwrap();

    assert_eq!(records.len(), 30);
    assert_eq!(records[0].frame, 1);
    assert_eq!(records[29].frame, 30);
    // Fixed mode at the nominal rate: one step per refresh.
    assert_eq!(records[29].diagnostics.steps, 30);
    assert!((records[29].diagnostics.time - 0.5).abs() < 1e-6);
}

#[test]
fn test_simulate_time_is_monotonic() {
    let lab = LabConfig::new(crate::demos::preset("collision-billiards").unwrap());
    let records = simulate(&lab, &options(20)).unwrap();
    for pair in records.windows(2) {
        assert!(pair[1].diagnostics.time >= pair[0].diagnostics.time);
    }
}

#[test]
fn test_simulate_zero_frames() {
    let lab = LabConfig::default();
    assert!(simulate(&lab, &options(0)).unwrap().is_empty());
}

#[test]
fn test_simulate_tiny_refresh_rate_does_not_overflow() {
    // 1/hz seconds would not fit in a Duration without clamping
    let lab = LabConfig::new(ExperimentConfig::Pendulum(PendulumConfig::default()));
    let run = RunOptions {
        frames: 3,
        refresh_hz: 1e-20,
        ..RunOptions::default()
    };
    let records = simulate(&lab, &run).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.diagnostics.time.is_finite()));
}

#[test]
fn test_run_frames_streams_without_reserving() {
    let lab = LabConfig::default();
    let run = options(u64::MAX);
    let mut seen = 0_u64;
    let result = run_frames(&lab, &run, |record| {
        seen += 1;
        if record.frame == 5 {
            return Err(SimError::config("enough frames"));
        }
        Ok(())
    });
    assert!(matches!(result, Err(SimError::Config { .. })));
    assert_eq!(seen, 5);
}

#[test]
fn test_run_frames_counts_delivered_frames() {
    let lab = LabConfig::new(crate::demos::preset("orbital").unwrap());
    let mut last = 0;
    let delivered = run_frames(&lab, &options(12), |record| {
        last = record.frame;
        Ok(())
    })
    .unwrap();
    assert_eq!(delivered, 12);
    assert_eq!(last, 12);
}

#[test]
fn test_strict_run_of_stable_lab_completes() {
    let lab = LabConfig::new(crate::demos::preset("collision-billiards").unwrap());
    let run = RunOptions {
        strict: true,
        ..options(60)
    };
    assert_eq!(simulate(&lab, &run).unwrap().len(), 60);
}

#[test]
fn test_exit_code_separates_numerical_faults() {
    let fault = SimError::NonFiniteValue {
        location: "pendulum at t=1.000s".to_string(),
    };
    assert_eq!(exit_code(&fault), ExitCode::from(2));
    assert_eq!(exit_code(&SimError::config("bad")), ExitCode::from(1));
}

#[test]
fn test_frame_record_json_line() {
    let lab = LabConfig::new(crate::demos::preset("wave").unwrap());
    let records = simulate(&lab, &options(1)).unwrap();
    let line = serde_json::to_string(&records[0]).unwrap();
    assert!(line.contains("\"frame\":1"));
    assert!(line.contains("\"type\":\"polyline\""));
}

#[test]
fn test_format_frame_summary() {
    let lab = LabConfig::new(crate::demos::preset("pendulum").unwrap());
    let records = simulate(&lab, &options(2)).unwrap();
    let line = format_frame_summary(&records[1]);
    assert!(line.starts_with("frame     2"));
    assert!(line.contains("E="));
    assert!(line.contains("cmds="));
}

#[test]
fn test_run_cli_help_and_version() {
    assert_eq!(run_cli(Args::parse_from(["simlab"])), ExitCode::SUCCESS);
    assert_eq!(
        run_cli(Args::parse_from(["simlab", "--version"])),
        ExitCode::SUCCESS
    );
    assert_eq!(
        run_cli(Args::parse_from(["simlab", "presets"])),
        ExitCode::SUCCESS
    );
}

#[test]
fn test_run_cli_unknown_preset_fails() {
    let code = run_cli(Args::parse_from(["simlab", "preset", "no-such-preset"]));
    assert_eq!(code, ExitCode::from(1));
}

#[test]
fn test_run_cli_missing_lab_file_fails() {
    let code = run_cli(Args::parse_from([
        "simlab",
        "run",
        "/nonexistent/simlab/lab.yaml",
    ]));
    assert_eq!(code, ExitCode::from(1));
}

#[test]
fn test_validate_lab_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("simlab-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("lab.yaml");
    let lab = LabConfig::new(crate::demos::preset("orbital-three-body").unwrap());
    std::fs::write(&path, lab.to_yaml().unwrap()).unwrap();

    assert_eq!(validate_lab_file(&path), ExitCode::SUCCESS);

    std::fs::write(&path, "experiment:\n  kind: wave\n  samples: 1\n").unwrap();
    assert_eq!(validate_lab_file(&path), ExitCode::from(1));

    std::fs::remove_dir_all(&dir).ok();
}
