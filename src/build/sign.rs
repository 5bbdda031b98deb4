//! Windows code signing with osslsigncode

use std::path::Path;

use anyhow::Result;
use console::style;

use crate::build::target::{supports_signing, Target};
use crate::config::SignCredentials;
use crate::error::{hints, GberError};
use crate::exec::{command_exists, run_command, ExecOptions};

/// Sign the produced binary in place, replacing it with the signed variant.
///
/// Non-windows targets and a missing osslsigncode skip with a warning; a
/// missing credential bundle is a configuration error, and a failing signer
/// run aborts the build after removing the partial output.
pub fn sign(
    target: &Target,
    bin_dir: &Path,
    bin_name: &str,
    creds: &SignCredentials,
) -> Result<()> {
    if !supports_signing(target) {
        eprintln!(
            "{} only windows binaries are signed, skipping for {}",
            style("⚠").yellow(),
            target
        );
        return Ok(());
    }

    if !command_exists("osslsigncode") {
        eprintln!(
            "{} osslsigncode not found, skipping signing\n{}",
            style("⚠").yellow(),
            hints::osslsigncode()
        );
        return Ok(());
    }

    if !Path::new(&creds.pfx_file_path).is_file() {
        return Err(GberError::config_error(format!(
            "pfx file not found: {}",
            creds.pfx_file_path
        ))
        .into());
    }

    eprintln!("{} Signing with osslsigncode...", style("→").cyan());

    let bin_path = bin_dir.join(bin_name);
    let signed_path = bin_dir.join(format!("signed_{}", bin_name));

    let args: Vec<String> = vec![
        "sign".into(),
        "-addUnauthenticatedBlob".into(),
        "-pkcs12".into(),
        creds.pfx_file_path.clone(),
        "-pass".into(),
        creds.pfx_password.clone(),
        "-n".into(),
        creds.pfx_company.clone(),
        "-i".into(),
        creds.pfx_website.clone(),
        "-in".into(),
        bin_path.to_string_lossy().into_owned(),
        "-out".into(),
        signed_path.to_string_lossy().into_owned(),
    ];
    let result = run_command("osslsigncode", &args, &ExecOptions::in_dir(bin_dir), false)?;

    if !result.success {
        let _ = std::fs::remove_file(&signed_path);
        return Err(GberError::build_failure(
            target.to_string(),
            format!(
                "osslsigncode exited with {}: {}",
                result.exit_code,
                result.stderr.trim()
            ),
        )
        .into());
    }

    std::fs::remove_file(&bin_path)?;
    std::fs::rename(&signed_path, &bin_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> SignCredentials {
        SignCredentials {
            pfx_file_path: "/nonexistent/certs/app.pfx".to_string(),
            pfx_password: "secret".to_string(),
            pfx_company: "Example Corp".to_string(),
            pfx_website: "https://example.com".to_string(),
        }
    }

    #[test]
    fn non_windows_targets_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let target = Target::parse("linux/amd64").unwrap();
        assert!(sign(&target, tmp.path(), "app", &creds()).is_ok());
    }

    #[test]
    fn darwin_targets_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let target = Target::parse("darwin/arm64").unwrap();
        assert!(sign(&target, tmp.path(), "app", &creds()).is_ok());
    }
}
