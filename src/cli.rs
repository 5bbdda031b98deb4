//! CLI argument parsing using clap derive macros

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{
    build::BuildCommand, clean::CleanCommand, init::InitCommand, targets::TargetsCommand,
};

/// gber - an enhanced cross-compilation build tool for Go projects
///
/// Builds a Go project for multiple os/arch targets in one run, with
/// optional obfuscation, CGO cross-compilation, packing, signing and
/// archiving.
#[derive(Parser, Debug)]
#[command(name = "gber")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the project for every configured target
    Build(BuildCommand),

    /// Create the build configuration for the current project
    Init(InitCommand),

    /// Remove the build output directory
    Clean(CleanCommand),

    /// List known build targets and their capabilities
    Targets(TargetsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        // Execute the subcommand
        match self.command {
            Commands::Build(cmd) => cmd.execute(self.verbose),
            Commands::Init(cmd) => cmd.execute(self.verbose),
            Commands::Clean(cmd) => cmd.execute(self.verbose),
            Commands::Targets(cmd) => cmd.execute(self.verbose),
        }
    }
}
