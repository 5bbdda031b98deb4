//! Clean command: remove the build output directory

use std::io::Write;

use anyhow::Result;
use clap::Args;
use console::style;

use crate::utils::paths::{build_dir, find_go_project_dir};

/// Remove the project's build directory
#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl CleanCommand {
    /// Execute the clean command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        let project_dir = find_go_project_dir(&current_dir)?;
        let build_dir = build_dir(&project_dir);

        if !build_dir.is_dir() {
            eprintln!("{} nothing to clean", style("ℹ").cyan());
            return Ok(());
        }

        if !self.yes && !confirm(&format!("Really remove {}?", build_dir.display()))? {
            eprintln!("aborted");
            return Ok(());
        }

        std::fs::remove_dir_all(&build_dir)?;
        if verbose {
            eprintln!("{} removed {}", style("✓").green(), build_dir.display());
        }
        Ok(())
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
