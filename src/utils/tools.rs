//! Tool detection and validation with graceful degradation
//!
//! gber orchestrates a handful of external tools. This module detects them
//! and produces helpful error messages when a required one is missing.

use std::path::PathBuf;

use anyhow::Result;

use crate::error::{hints, GberError};
use crate::exec::{command_exists, run_command, ExecOptions};

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Path to the tool executable
    pub path: PathBuf,
    /// Tool version string (if available)
    pub version: Option<String>,
}

/// Check if a tool exists and return its information
pub fn check_tool(tool_name: &str) -> Option<ToolInfo> {
    match which::which(tool_name) {
        Ok(path) => {
            let version = get_tool_version(tool_name);
            Some(ToolInfo {
                name: tool_name.to_string(),
                path,
                version,
            })
        }
        Err(_) => None,
    }
}

/// Get tool version by running `tool --version` (or `tool version` for go)
fn get_tool_version(tool_name: &str) -> Option<String> {
    let arg = if tool_name == "go" { "version" } else { "--version" };
    let result = run_command(
        tool_name,
        &[arg.to_string()],
        &ExecOptions::default(),
        false,
    )
    .ok()?;

    if result.success {
        Some(result.stdout.lines().next().unwrap_or("").trim().to_string())
    } else {
        None
    }
}

/// Require a tool to exist, return error with hint if missing
pub fn require_tool(tool_name: &str, required_for: &str) -> Result<ToolInfo> {
    match check_tool(tool_name) {
        Some(info) => Ok(info),
        None => Err(GberError::missing_tool(
            tool_name,
            required_for,
            get_tool_hint(tool_name),
        )
        .into()),
    }
}

/// Get installation hint for a tool
pub fn get_tool_hint(tool_name: &str) -> &'static str {
    match tool_name {
        "go" => hints::go(),
        "garble" => hints::garble(),
        "zig" => hints::zig(),
        "xgo" => hints::xgo(),
        "upx" => hints::upx(),
        "osslsigncode" => hints::osslsigncode(),
        _ => "Install this tool and ensure it's in your PATH",
    }
}

/// Ensure garble is available, installing it through `go install` if missing
pub fn ensure_garble() -> Result<()> {
    if command_exists("garble") {
        return Ok(());
    }

    eprintln!(
        "{} garble not found, installing with go install...",
        console::style("ℹ").cyan()
    );
    let args: Vec<String> = vec!["install".into(), "mvdan.cc/garble@latest".into()];
    let result = run_command("go", &args, &ExecOptions::default(), false)?;
    if result.success && command_exists("garble") {
        return Ok(());
    }

    Err(GberError::missing_tool("garble", "obfuscated builds", hints::garble()).into())
}
