//! Executable packing with UPX
//!
//! Packing is optional post-processing: an unsupported target or a missing
//! upx binary skips the step with a warning. A upx run that fails, however,
//! aborts the build after removing the partial output.

use std::path::Path;

use anyhow::Result;
use console::style;

use crate::build::target::{supports_upx, Target};
use crate::error::{hints, GberError};
use crate::exec::{command_exists, run_command, ExecOptions};

/// Pack the produced binary in place, replacing it with the packed variant
pub fn pack(target: &Target, bin_dir: &Path, bin_name: &str) -> Result<()> {
    if !supports_upx(target) {
        eprintln!(
            "{} packing with UPX is not supported for {}, skipping",
            style("⚠").yellow(),
            target
        );
        return Ok(());
    }

    if !command_exists("upx") {
        eprintln!(
            "{} upx not found, skipping packing\n{}",
            style("⚠").yellow(),
            hints::upx()
        );
        return Ok(());
    }

    eprintln!("{} Packing with UPX...", style("→").cyan());

    let bin_path = bin_dir.join(bin_name);
    let packed_path = bin_dir.join(format!("packed_{}", bin_name));

    let args: Vec<String> = vec![
        "-9".into(),
        "-o".into(),
        packed_path.to_string_lossy().into_owned(),
        bin_path.to_string_lossy().into_owned(),
    ];
    let result = run_command("upx", &args, &ExecOptions::in_dir(bin_dir), false)?;

    if !result.success {
        // Drop the partial output, keep the unpacked binary on disk.
        let _ = std::fs::remove_file(&packed_path);
        return Err(GberError::build_failure(
            target.to_string(),
            format!("upx exited with {}: {}", result.exit_code, result.stderr.trim()),
        )
        .into());
    }

    std::fs::remove_file(&bin_path)?;
    std::fs::rename(&packed_path, &bin_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_target_is_skipped_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let target = Target::parse("darwin/arm64").unwrap();
        // No binary needs to exist: the capability check short-circuits.
        assert!(pack(&target, tmp.path(), "app").is_ok());
    }

    #[test]
    fn windows_arm64_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let target = Target::parse("windows/arm64").unwrap();
        assert!(pack(&target, tmp.path(), "app.exe").is_ok());
    }
}
