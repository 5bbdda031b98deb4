//! Error types and helpers for user-friendly error messages
//!
//! This module provides custom error types with actionable hints so users
//! can quickly resolve common configuration and toolchain issues.

use thiserror::Error;

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum GberError {
    /// Configuration file errors
    #[error("Configuration error: {message}{}", format_hint(.hint))]
    Config {
        message: String,
        hint: Option<String>,
    },

    /// Tool/executable not found or misconfigured
    #[error("Missing tool: {tool} (required for {required_for})\nHINT: {hint}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// Build failure for a specific target
    #[error("Build failed for {target}: {message}")]
    BuildFailure { target: String, message: String },

    /// A feature was requested for a target that cannot support it
    #[error("{feature} is not supported for {target}")]
    UnsupportedTarget { feature: String, target: String },
}

fn format_hint(hint: &Option<String>) -> String {
    match hint {
        Some(h) => format!("\nHINT: {}", h),
        None => String::new(),
    }
}

impl GberError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a configuration error with a hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Create a build failure error
    pub fn build_failure(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BuildFailure {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported target error
    pub fn unsupported_target(
        feature: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::UnsupportedTarget {
            feature: feature.into(),
            target: target.into(),
        }
    }
}

/// Common error hints for missing tools
pub mod hints {
    /// Get hint for a missing Go toolchain
    pub fn go() -> &'static str {
        "Install Go from https://go.dev/dl/ or use your package manager:\n\
         • macOS: brew install go\n\
         • Ubuntu: sudo apt install golang-go\n\
         • Windows: winget install GoLang.Go"
    }

    /// Get hint for missing garble
    pub fn garble() -> &'static str {
        "Install garble for obfuscated builds:\n\
         • go install mvdan.cc/garble@latest\n\
         \n\
         Ensure $GOPATH/bin (or $HOME/go/bin) is in your PATH."
    }

    /// Get hint for missing zig
    pub fn zig() -> &'static str {
        "Install zig, which gber uses as a C/C++ cross-toolchain for CGO:\n\
         • macOS: brew install zig\n\
         • Ubuntu: sudo snap install zig --classic\n\
         • Or download from https://ziglang.org/download/"
    }

    /// Get hint for missing xgo
    pub fn xgo() -> &'static str {
        "Install xgo for containerized CGO cross-compilation:\n\
         • go install github.com/crazy-max/xgo@latest\n\
         • docker pull ghcr.io/crazy-max/xgo:latest\n\
         \n\
         A Docker daemon must be running."
    }

    /// Get hint for missing upx
    pub fn upx() -> &'static str {
        "Install UPX for executable packing:\n\
         • macOS: brew install upx\n\
         • Ubuntu: sudo apt install upx-ucl\n\
         • Windows: winget install upx.upx"
    }

    /// Get hint for missing osslsigncode
    pub fn osslsigncode() -> &'static str {
        "Install osslsigncode for signing Windows binaries:\n\
         • macOS: brew install osslsigncode\n\
         • Ubuntu: sudo apt install osslsigncode"
    }

    /// Get hint for a missing or invalid build configuration
    pub fn gbuild_conf() -> &'static str {
        "No build configuration found.\n\
         \n\
         To create one in the current Go project:\n\
         • Run: gber init\n\
         \n\
         Then edit build/gbuild.json to adjust targets and flags."
    }

    /// Get hint for running outside a Go project
    pub fn go_project() -> &'static str {
        "Could not find go.mod in the current directory or any parent.\n\
         Run gber from within a Go module (or create one with: go mod init)."
    }
}
