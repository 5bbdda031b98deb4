//! Subprocess execution helpers

pub mod subprocess;

pub use subprocess::{command_exists, run_command, CommandResult, ExecOptions};
