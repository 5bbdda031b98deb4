//! Targets command: list known os/arch pairs and their capabilities

use anyhow::Result;
use clap::Args;
use console::style;

use crate::build::target::{
    common_targets, other_targets, supports_cgo, supports_signing, supports_upx, Target,
};

/// List known build targets and what each supports
#[derive(Args, Debug)]
pub struct TargetsCommand {
    /// Also list the uncommon targets known to `go tool dist list`
    #[arg(long)]
    pub all: bool,
}

impl TargetsCommand {
    /// Execute the targets command
    pub fn execute(self, _verbose: bool) -> Result<()> {
        println!("{}", style("Commonly used targets:").bold());
        for pair in common_targets() {
            let target = Target::parse(pair)?;
            let mut caps: Vec<&str> = Vec::new();
            if supports_cgo(&target) {
                caps.push("cgo");
            }
            if supports_upx(&target) {
                caps.push("upx");
            }
            if supports_signing(&target) {
                caps.push("sign");
            }
            println!("  {:<16} {}", pair, caps.join(","));
        }

        if self.all {
            let others = other_targets();
            if others.is_empty() {
                eprintln!(
                    "{} go toolchain unavailable, cannot list further targets",
                    style("⚠").yellow()
                );
            } else {
                println!("\n{}", style("Other targets:").bold());
                for pair in others {
                    println!("  {}", pair);
                }
            }
        }
        Ok(())
    }
}
