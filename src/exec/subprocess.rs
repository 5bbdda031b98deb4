//! Blocking subprocess execution
//!
//! All external tools (go, garble, zig, xgo, upx, osslsigncode, docker) are
//! invoked through [`run_command`]. Target-specific environment variables
//! (GOOS, GOARCH, CC, ...) are passed explicitly per invocation instead of
//! mutating the process environment, so no state leaks between targets.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Result of a subprocess execution
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code
    pub exit_code: i32,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(
        status: ExitStatus,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        let exit_code = status.code().unwrap_or(-1);
        Self {
            success: status.success(),
            exit_code,
            stdout,
            stderr,
            duration,
        }
    }
}

/// Per-invocation execution options
#[derive(Debug, Default, Clone)]
pub struct ExecOptions {
    /// Working directory for the child process
    pub cwd: Option<PathBuf>,

    /// Extra environment variables, applied on top of the inherited ones
    pub env: Vec<(String, String)>,
}

impl ExecOptions {
    /// Options with only a working directory set
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            env: Vec::new(),
        }
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Run a command, either streaming its output or capturing it
pub fn run_command(
    program: &str,
    args: &[String],
    opts: &ExecOptions,
    inherit_io: bool,
) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(dir) = &opts.cwd {
        cmd.current_dir(dir);
    }
    for (key, value) in &opts.env {
        cmd.env(key, value);
    }

    if inherit_io {
        // Stream compiler/tool output directly to the terminal
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let status = cmd
            .status()
            .with_context(|| format!("Failed to execute {}", program))?;

        let duration = start.elapsed();
        Ok(CommandResult::from_status(
            status,
            String::new(),
            String::new(),
            duration,
        ))
    } else {
        // Capture output
        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute {}", program))?;

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        Ok(CommandResult::from_status(
            output.status,
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}
