//! Build command implementation

use anyhow::Result;
use clap::Args;

use crate::build::Builder;
use crate::commands::unescape_injection_args;
use crate::config::BuildSpec;
use crate::error::{hints, GberError};
use crate::utils::paths::find_go_project_dir;

/// Build the Go project for every configured target
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Compiler arguments overriding the configured ones for this run.
    ///
    /// `#` is unescaped to `$`, so injection tokens can be written as
    /// `#(git rev-parse HEAD)` without shell quoting.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        let project_dir = find_go_project_dir(&current_dir)?;

        let mut spec = BuildSpec::load(&project_dir)?.ok_or_else(|| {
            GberError::config_error_with_hint(
                format!("no build configuration in {}", project_dir.display()),
                hints::gbuild_conf(),
            )
        })?;

        if !self.args.is_empty() {
            spec.build_args = unescape_injection_args(&self.args);
        }
        if spec.work_dir.as_os_str().is_empty() {
            spec.work_dir = current_dir;
        }

        Builder::new(spec, project_dir, verbose)?.build_all()
    }
}
