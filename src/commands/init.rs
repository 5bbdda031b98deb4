//! Init command: write the build configuration template

use anyhow::Result;
use clap::Args;
use console::style;

use crate::build::target::Target;
use crate::commands::unescape_injection_args;
use crate::config::{BuildSpec, CONF_FILE_NAME};
use crate::error::GberError;
use crate::utils::paths::find_go_project_dir;

/// Create build/gbuild.json for the current Go project
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Target os/arch pairs, comma-separated (default: the host target)
    #[arg(long, short = 't')]
    pub targets: Option<String>,

    /// Overwrite an existing configuration
    #[arg(long)]
    pub force: bool,

    /// Initial compiler arguments (`#` is unescaped to `$`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(self, _verbose: bool) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        let project_dir = find_go_project_dir(&current_dir)?;

        let conf_path = BuildSpec::conf_path(&project_dir);
        if conf_path.is_file() && !self.force {
            return Err(GberError::config_error_with_hint(
                format!("{} already exists", conf_path.display()),
                "pass --force to overwrite it",
            )
            .into());
        }

        let mut spec = BuildSpec::template(current_dir);
        if let Some(targets) = &self.targets {
            let pairs: Vec<String> = targets
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            for pair in &pairs {
                Target::parse(pair)?;
            }
            spec.arch_os_list = pairs;
        }
        if !self.args.is_empty() {
            spec.build_args = unescape_injection_args(&self.args);
        }

        spec.validate()?;
        spec.save(&project_dir)?;

        eprintln!(
            "{} wrote {}\n  Edit it to adjust targets, flags and the post-build pipeline,\n  then run: gber build",
            style("✓").green(),
            project_dir.join("build").join(CONF_FILE_NAME).display()
        );
        Ok(())
    }
}
