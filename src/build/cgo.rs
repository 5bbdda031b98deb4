//! CGO cross-compilation through the zig toolchain
//!
//! zig ships C/C++ cross-compilers for every target triple gber supports,
//! which makes CGO builds possible without per-target sysroots. Each
//! supported target maps to a `zig cc -target <triple>` proxy plus the
//! extra build flags that target needs (static external linking on linux,
//! pie + stripped symbols on darwin).

use anyhow::Result;

use crate::build::flags::merge_build_flags;
use crate::build::target::{supports_cgo, Target};
use crate::error::{hints, GberError};
use crate::exec::command_exists;

/// Environment and flags selecting a zig cross-toolchain for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZigToolchain {
    /// Environment variables for the compiler subprocess
    /// (CGO_ENABLED, CC, CXX, CGO_CFLAGS)
    pub env: Vec<(String, String)>,

    /// Extra build flags this target mandates, merged into the user's flags
    pub extra_build_flags: Option<&'static str>,
}

const STATIC_LINK_FLAGS: &str = "-ldflags='-linkmode=external -extldflags -static'";
const DARWIN_EXTRA_FLAGS: &str = "-v -x -a -buildmode=pie -ldflags=\"-s -w\"";

/// Resolve the zig toolchain for a target. `None` for unsupported pairs.
pub fn zig_toolchain(target: &Target) -> Option<ZigToolchain> {
    let triple = match (target.os.as_str(), target.arch.as_str()) {
        ("linux", "amd64") => "x86_64-linux-musl",
        ("linux", "arm64") => "aarch64-linux-musl",
        ("windows", "amd64") => "x86_64-windows-gnu",
        // https://github.com/ziglang/zig/issues/9050
        ("darwin", "amd64") => "x86_64-macos-gnu",
        ("darwin", "arm64") => "aarch64-macos-gnu",
        _ => return None,
    };

    let cc = format!("zig cc -target {}", triple);
    let mut env = vec![
        ("CGO_ENABLED".to_string(), "1".to_string()),
        ("CC".to_string(), cc.clone()),
        ("CXX".to_string(), cc),
    ];

    let extra_build_flags = if target.is_linux() {
        // Large-file support is not implied by the musl headers.
        env.push(("CGO_CFLAGS".to_string(), "-D_LARGEFILE64_SOURCE".to_string()));
        Some(STATIC_LINK_FLAGS)
    } else if target.is_darwin() {
        Some(DARWIN_EXTRA_FLAGS)
    } else {
        None
    };

    Some(ZigToolchain {
        env,
        extra_build_flags,
    })
}

/// Whether the zig binary is available
pub fn is_zig_installed() -> bool {
    command_exists("zig")
}

/// Resolve and validate the toolchain for a CGO build.
///
/// CGO was explicitly requested, so an unsupported target or missing zig is
/// fatal rather than skipped.
pub fn require_zig_toolchain(target: &Target) -> Result<ZigToolchain> {
    if !supports_cgo(target) {
        return Err(GberError::unsupported_target("CGO", target.to_string()).into());
    }
    if !is_zig_installed() {
        return Err(GberError::missing_tool("zig", "CGO cross-compilation", hints::zig()).into());
    }
    zig_toolchain(target).ok_or_else(|| {
        GberError::unsupported_target("CGO", target.to_string()).into()
    })
}

/// Merge the toolchain's mandated flags into the compiler argument vector
pub fn apply_cgo_flags(args: &[String], toolchain: &ZigToolchain) -> Vec<String> {
    match toolchain.extra_build_flags {
        Some(extra) => merge_build_flags(args, extra),
        None => args.to_vec(),
    }
}
