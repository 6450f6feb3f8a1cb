//! CLI module for simlab.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! The entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{
    clamp_refresh_hz, Args, Command, RunOptions, DEFAULT_FRAMES, DEFAULT_REFRESH_HZ,
    MAX_REFRESH_HZ, MIN_REFRESH_HZ,
};
pub use commands::{exit_code, run_cli, run_frames, simulate, FrameRecord};
pub use output::{format_frame_summary, print_help, print_version};

#[cfg(test)]
mod tests;
