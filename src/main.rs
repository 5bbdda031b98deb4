//! gber CLI - an enhanced cross-compilation build tool for Go projects
//!
//! One `gber build` compiles a Go project for every configured os/arch
//! target, picking the right compiler strategy per target (plain go build,
//! garble obfuscation, CGO through zig, or containerized CGO through xgo)
//! and running the post-build pipeline: UPX packing, osslsigncode signing
//! and zip archiving.

mod build;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod utils;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.execute()
}
