//! Containerized CGO cross-compilation through xgo
//!
//! xgo (https://github.com/crazy-max/xgo) runs the whole build inside a
//! Docker image bundling cross-toolchains for every target. Instead of
//! invoking `go build` directly, the synthesized native argument vector is
//! rewritten into xgo's own flag dialect.

use std::path::Path;

use anyhow::Result;

use crate::build::target::Target;
use crate::error::{hints, GberError};
use crate::exec::{command_exists, run_command, ExecOptions};

/// Parameters for one xgo invocation, extracted from configuration and
/// environment before translation so the translation itself stays pure.
#[derive(Debug, Clone, Default)]
pub struct XgoOptions {
    /// Dependency spec (xgo `-deps`)
    pub deps: Option<String>,
    /// Dependency build arguments (xgo `-depsargs`)
    pub deps_args: Option<String>,
    /// Docker image reference
    pub image: String,
    /// Go module proxy, from GOPROXY
    pub goproxy: Option<String>,
}

/// Whether the xgo binary is available.
///
/// Probed with `xgo -h` from the user's home directory so a project-local
/// go.mod cannot interfere with the probe.
pub fn is_xgo_installed() -> bool {
    if !command_exists("xgo") {
        return false;
    }
    let opts = match directories::UserDirs::new() {
        Some(dirs) => ExecOptions::in_dir(dirs.home_dir()),
        None => ExecOptions::default(),
    };
    run_command("xgo", &["-h".to_string()], &opts, false)
        .map(|r| r.success)
        .unwrap_or(false)
}

/// Scan locally available Docker images for an xgo image
pub fn find_xgo_docker_image() -> Option<String> {
    let args: Vec<String> = vec!["images".into()];
    let result = run_command("docker", &args, &ExecOptions::default(), false).ok()?;
    if !result.success {
        return None;
    }

    result
        .stdout
        .lines()
        .find(|line| line.contains("crazy-max/xgo"))
        .and_then(|line| line.split_whitespace().next())
        .map(String::from)
}

/// Resolve the Docker image for xgo: configured name first, then a scan of
/// local images. No image at all is fatal, xgo cannot run without one.
pub fn resolve_image(configured: &str) -> Result<String> {
    if !configured.is_empty() {
        return Ok(configured.to_string());
    }
    find_xgo_docker_image().ok_or_else(|| {
        GberError::missing_tool("xgo docker image", "containerized builds", hints::xgo()).into()
    })
}

/// Make a path relative to the working directory; outside paths stay absolute
fn relative_to(path: &Path, work_dir: &Path) -> String {
    match path.strip_prefix(work_dir) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Rewrite a native `go build` argument vector into xgo's flag dialect.
///
/// Emission order is fixed so invocations are reproducible: deps, depsargs,
/// dest, docker-image, goproxy, ldflags, out, pkg, targets, then the bare
/// pass-through flags.
pub fn translate(
    native_args: &[String],
    target: &Target,
    bin_dir: &Path,
    bin_name: &str,
    work_dir: &Path,
    opts: &XgoOptions,
) -> Vec<String> {
    let mut ldflags: Option<String> = None;
    let mut passthrough: Vec<&str> = Vec::new();

    for (idx, arg) in native_args.iter().enumerate() {
        match arg.as_str() {
            "-ldflags" => {
                if let Some(value) = native_args.get(idx + 1) {
                    ldflags = Some(value.clone());
                }
            }
            "-v" | "-x" | "-trimpath" => passthrough.push(arg),
            _ => {
                if let Some(value) = arg.strip_prefix("-ldflags=") {
                    ldflags = Some(value.to_string());
                }
            }
        }
    }

    let pkg = native_args
        .last()
        .map(|p| relative_to(Path::new(p), work_dir))
        .unwrap_or_else(|| ".".to_string());

    let mut args: Vec<String> = Vec::new();
    if let Some(deps) = &opts.deps {
        args.push(format!("-deps={}", deps));
    }
    if let Some(deps_args) = &opts.deps_args {
        args.push(format!("-depsargs={}", deps_args));
    }
    args.push(format!("-dest={}", relative_to(bin_dir, work_dir)));
    args.push(format!("-docker-image={}", opts.image));
    if let Some(goproxy) = &opts.goproxy {
        args.push(format!("-goproxy={}", goproxy));
    }
    if let Some(ldflags) = ldflags {
        args.push(format!("-ldflags={}", ldflags));
    }
    args.push(format!("-out={}", bin_name));
    args.push(format!("-pkg={}", pkg));
    args.push(format!("-targets={}", target));
    args.extend(passthrough.iter().map(|s| s.to_string()));
    args
}

/// Rename the target-qualified artifact xgo produces (e.g.
/// `app-windows-4.0-amd64.exe`) back to the plain binary name.
///
/// Only a file matching `<base>-<os>-…<arch>…` with no foreign extension is
/// renamed; sibling archives or checksum files stay untouched.
pub fn fix_binary_name(bin_dir: &Path, bin_name: &str, target: &Target) -> Result<()> {
    let base = bin_name.trim_end_matches(".exe");
    let prefix = format!("{}-{}-", base, target.os);
    let entries = std::fs::read_dir(bin_dir)?;
    for entry in entries.flatten() {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == bin_name || !name.starts_with(&prefix) {
            continue;
        }
        let rest = &name[prefix.len()..];
        if !rest.contains(&target.arch) {
            continue;
        }
        if rest.contains('.') && !rest.ends_with(".exe") {
            continue;
        }
        std::fs::rename(entry.path(), bin_dir.join(bin_name))?;
        break;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(pair: &str) -> Target {
        Target::parse(pair).unwrap()
    }

    fn v(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn opts() -> XgoOptions {
        XgoOptions {
            deps: None,
            deps_args: None,
            image: "ghcr.io/crazy-max/xgo:latest".to_string(),
            goproxy: None,
        }
    }

    #[test]
    fn translates_full_vector_in_stable_order() {
        let native = v(&[
            "-v",
            "-ldflags",
            "-s -w",
            "-o",
            "/proj/build/linux-amd64/app",
            "/proj/cmd/app",
        ]);
        let args = translate(
            &native,
            &t("linux/amd64"),
            Path::new("/proj/build/linux-amd64"),
            "app",
            Path::new("/proj"),
            &opts(),
        );

        assert_eq!(
            args,
            v(&[
                "-dest=build/linux-amd64",
                "-docker-image=ghcr.io/crazy-max/xgo:latest",
                "-ldflags=-s -w",
                "-out=app",
                "-pkg=cmd/app",
                "-targets=linux/amd64",
                "-v",
            ])
        );
    }

    #[test]
    fn ldflags_equals_form_is_recognized() {
        let native = v(&["-ldflags=-s -w", "-o", "/proj/build/x/app", "/proj"]);
        let args = translate(
            &native,
            &t("windows/amd64"),
            Path::new("/proj/build/x"),
            "app.exe",
            Path::new("/proj"),
            &opts(),
        );
        assert!(args.contains(&"-ldflags=-s -w".to_string()));
        assert!(args.contains(&"-out=app.exe".to_string()));
    }

    #[test]
    fn package_inside_work_dir_becomes_relative() {
        let native = v(&["/proj"]);
        let args = translate(
            &native,
            &t("linux/arm64"),
            Path::new("/proj/build/linux-arm64"),
            "proj",
            Path::new("/proj"),
            &opts(),
        );
        assert!(args.contains(&"-pkg=.".to_string()));
    }

    #[test]
    fn deps_and_proxy_are_emitted_first() {
        let mut options = opts();
        options.deps = Some("https://example.com/libfoo.tar.gz".to_string());
        options.deps_args = Some("--disable-shared".to_string());
        options.goproxy = Some("https://proxy.golang.org".to_string());

        let args = translate(
            &v(&["/proj/cmd/app"]),
            &t("linux/amd64"),
            Path::new("/proj/build/linux-amd64"),
            "app",
            Path::new("/proj"),
            &options,
        );

        assert_eq!(args[0], "-deps=https://example.com/libfoo.tar.gz");
        assert_eq!(args[1], "-depsargs=--disable-shared");
        assert!(args.contains(&"-goproxy=https://proxy.golang.org".to_string()));
    }

    #[test]
    fn trimpath_passes_through() {
        let args = translate(
            &v(&["-trimpath", "-x", "/proj/cmd/app"]),
            &t("linux/amd64"),
            Path::new("/proj/build/linux-amd64"),
            "app",
            Path::new("/proj"),
            &opts(),
        );
        let tail = &args[args.len() - 2..];
        assert_eq!(tail, &v(&["-trimpath", "-x"])[..]);
    }

    #[test]
    fn renames_target_qualified_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("app-linux-amd64"), b"bin").unwrap();
        fix_binary_name(tmp.path(), "app", &t("linux/amd64")).unwrap();
        assert!(tmp.path().join("app").exists());
        assert!(!tmp.path().join("app-linux-amd64").exists());
    }

    #[test]
    fn sibling_artifacts_are_not_renamed_over_the_binary() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("app-linux-amd64"), b"bin").unwrap();
        std::fs::write(tmp.path().join("app-linux-amd64.zip"), b"zip").unwrap();
        std::fs::write(tmp.path().join("app-linux-amd64.sha256"), b"sum").unwrap();
        fix_binary_name(tmp.path(), "app", &t("linux/amd64")).unwrap();

        assert_eq!(std::fs::read(tmp.path().join("app")).unwrap(), b"bin");
        assert!(tmp.path().join("app-linux-amd64.zip").exists());
        assert!(tmp.path().join("app-linux-amd64.sha256").exists());
    }

    #[test]
    fn versioned_windows_artifact_is_renamed() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("app-windows-4.0-amd64.exe"), b"bin").unwrap();
        fix_binary_name(tmp.path(), "app.exe", &t("windows/amd64")).unwrap();
        assert!(tmp.path().join("app.exe").exists());
        assert!(!tmp.path().join("app-windows-4.0-amd64.exe").exists());
    }
}
