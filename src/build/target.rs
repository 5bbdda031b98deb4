//! Build targets and the static capability matrix
//!
//! A target is an `os/arch` pair in the notation used by `go tool dist list`.
//! The capability tables answer, per pair, whether CGO cross-compilation and
//! UPX packing are possible. Lookups are pure and total: unlisted pairs are
//! simply unsupported.

use std::fmt;

use anyhow::Result;

use crate::error::GberError;
use crate::exec::{run_command, ExecOptions};

pub const OS_LINUX: &str = "linux";
pub const OS_DARWIN: &str = "darwin";
pub const OS_WINDOWS: &str = "windows";

/// One build target: an operating system / architecture pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub os: String,
    pub arch: String,
}

impl Target {
    /// Parse an `os/arch` pair. Exactly one separator, both halves non-empty.
    pub fn parse(pair: &str) -> Result<Self> {
        let mut parts = pair.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(os), Some(arch), None) if !os.is_empty() && !arch.is_empty() => {
                Ok(Self {
                    os: os.to_string(),
                    arch: arch.to_string(),
                })
            }
            _ => Err(GberError::config_error(format!(
                "malformed target '{}', expected os/arch (e.g. linux/amd64)",
                pair
            ))
            .into()),
        }
    }

    pub fn is_windows(&self) -> bool {
        self.os == OS_WINDOWS
    }

    pub fn is_darwin(&self) -> bool {
        self.os == OS_DARWIN
    }

    pub fn is_linux(&self) -> bool {
        self.os == OS_LINUX
    }

    /// Directory name used under `build/`, e.g. `linux-amd64`
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Commonly used targets, offered as the default selection
pub fn common_targets() -> &'static [&'static str] {
    &[
        "darwin/amd64",
        "darwin/arm64",
        "linux/amd64",
        "linux/arm64",
        "windows/amd64",
        "windows/arm64",
    ]
}

/// The host's own target pair, mapped to Go's arch naming
pub fn host_target() -> String {
    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    };
    format!("{}/{}", std::env::consts::OS, arch)
}

/// Whether CGO cross-compilation through the zig toolchain is supported
pub fn supports_cgo(target: &Target) -> bool {
    match (target.os.as_str(), target.arch.as_str()) {
        (OS_LINUX | OS_DARWIN, "amd64" | "arm64") => true,
        (OS_WINDOWS, "amd64") => true,
        _ => false,
    }
}

/// Whether UPX packing is supported.
///
/// UPX cannot pack Mach-O binaries: packed darwin executables segfault.
pub fn supports_upx(target: &Target) -> bool {
    match (target.os.as_str(), target.arch.as_str()) {
        (OS_LINUX, "amd64" | "arm64") => true,
        (OS_WINDOWS, "amd64") => true,
        _ => false,
    }
}

/// Whether code signing applies. Only Windows binaries are signed.
pub fn supports_signing(target: &Target) -> bool {
    target.is_windows()
}

/// Targets known to `go tool dist list` that are not in the common set.
///
/// Returns an empty list when the Go toolchain is unavailable.
pub fn other_targets() -> Vec<String> {
    let args: Vec<String> = vec!["tool".into(), "dist".into(), "list".into()];
    let Ok(result) = run_command("go", &args, &ExecOptions::default(), false) else {
        return Vec::new();
    };
    if !result.success {
        return Vec::new();
    }

    result
        .stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !common_targets().contains(line))
        .map(String::from)
        .collect()
}
