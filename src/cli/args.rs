//! CLI argument parsing.
//!
//! Hand-rolled so parsing can be tested from any iterator of strings.

use std::path::PathBuf;

/// Frames run when `--frames` is not given.
pub const DEFAULT_FRAMES: u64 = 300;

/// Refresh rate used when `--hz` is not given.
pub const DEFAULT_REFRESH_HZ: f64 = 60.0;

/// Slowest accepted `--hz`.
pub const MIN_REFRESH_HZ: f64 = 1.0;

/// Fastest accepted `--hz`.
pub const MAX_REFRESH_HZ: f64 = 1000.0;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Options shared by the commands that run an experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Display refreshes to simulate.
    pub frames: u64,
    /// Simulated display refresh rate (Hz).
    pub refresh_hz: f64,
    /// Print one JSON record per frame instead of a text summary.
    pub json: bool,
    /// Stop at the first non-finite state instead of resetting and going on.
    pub strict: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: DEFAULT_FRAMES,
            refresh_hz: DEFAULT_REFRESH_HZ,
            json: false,
            strict: false,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a lab file
    Run {
        /// Path to the lab YAML file.
        lab_path: PathBuf,
        /// Run options.
        options: RunOptions,
    },
    /// Run a named preset
    Preset {
        /// Preset name.
        name: String,
        /// Run options.
        options: RunOptions,
    },
    /// List preset names
    ListPresets,
    /// Validate a lab file without running it
    Validate {
        /// Path to the lab YAML file.
        lab_path: PathBuf,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(args),
            "preset" => Self::parse_preset_command(args),
            "presets" | "list-presets" => Command::ListPresets,
            "validate" => Self::parse_validate_command(args),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                log::warn!("unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    fn parse_run_command(args: &[String]) -> Command {
        if args.len() < 3 {
            log::warn!("'run' requires a lab file path");
            return Command::Help;
        }
        Command::Run {
            lab_path: PathBuf::from(&args[2]),
            options: Self::parse_run_options(&args[3..]),
        }
    }

    fn parse_preset_command(args: &[String]) -> Command {
        if args.len() < 3 {
            log::warn!("'preset' requires a preset name");
            return Command::Help;
        }
        Command::Preset {
            name: args[2].clone(),
            options: Self::parse_run_options(&args[3..]),
        }
    }

    fn parse_validate_command(args: &[String]) -> Command {
        if args.len() < 3 {
            log::warn!("'validate' requires a lab file path");
            return Command::Help;
        }
        Command::Validate {
            lab_path: PathBuf::from(&args[2]),
        }
    }

    /// Parse `--frames N`, `--hz H`, `--json` and `--strict`; unknown or
    /// malformed flags are skipped. `--hz` is clamped into
    /// `[MIN_REFRESH_HZ, MAX_REFRESH_HZ]`.
    fn parse_run_options(rest: &[String]) -> RunOptions {
        let mut options = RunOptions::default();
        let mut i = 0;
        while i < rest.len() {
            match rest[i].as_str() {
                "--frames" | "-n" => {
                    if let Some(n) = rest.get(i + 1).and_then(|v| v.parse().ok()) {
                        options.frames = n;
                    }
                    i += 2;
                }
                "--hz" => {
                    if let Some(hz) = rest
                        .get(i + 1)
                        .and_then(|v| v.parse::<f64>().ok())
                        .filter(|hz| hz.is_finite() && *hz > 0.0)
                    {
                        options.refresh_hz = clamp_refresh_hz(hz);
                    }
                    i += 2;
                }
                "--json" => {
                    options.json = true;
                    i += 1;
                }
                "--strict" => {
                    options.strict = true;
                    i += 1;
                }
                other => {
                    log::warn!("ignoring unknown option: {other}");
                    i += 1;
                }
            }
        }
        options
    }
}

/// Clamp a refresh rate into `[MIN_REFRESH_HZ, MAX_REFRESH_HZ]`; anything
/// that is not a positive number falls back to [`DEFAULT_REFRESH_HZ`].
#[must_use]
pub fn clamp_refresh_hz(hz: f64) -> f64 {
    if hz.is_finite() && hz > 0.0 {
        hz.clamp(MIN_REFRESH_HZ, MAX_REFRESH_HZ)
    } else {
        DEFAULT_REFRESH_HZ
    }
}
