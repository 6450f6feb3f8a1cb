//! simlab CLI - real-time physics experiments
//!
//! All logic lives in the `cli` module; this file only wires up logging and
//! the exit code.

use simlab::cli::{run_cli, Args};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    run_cli(Args::parse())
}
