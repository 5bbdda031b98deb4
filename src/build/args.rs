//! Build-argument synthesis
//!
//! Takes the user's raw `go build` arguments and produces the final argument
//! vector for one target: the package argument is normalized, any declared
//! `-o` output is extracted, and a computed `-o build/<os>-<arch>/<name>`
//! pair is inserted immediately before the package argument. Flags that must
//! precede the package path keep their positions.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use anyhow::Result;

use crate::build::target::Target;
use crate::error::GberError;
use crate::utils::paths::ensure_dir;

pub const WIN_SUFFIX: &str = ".exe";

/// Result of argument synthesis for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedArgs {
    /// Final arguments for the compiler, ending with the package argument
    pub args: Vec<String>,
    /// Directory the binary is written to: `<project>/build/<os>-<arch>`
    pub bin_dir: PathBuf,
    /// Binary file name, with `.exe` appended for windows targets
    pub bin_name: String,
}

/// Does this argument look like a package path rather than a bare flag/name?
fn looks_like_path(arg: &str) -> bool {
    arg.starts_with('.') || arg.contains('/') || arg.contains(MAIN_SEPARATOR)
}

/// Synthesize the final argument vector for one target.
///
/// `raw_args` is never mutated; the returned vector is a fresh copy.
pub fn synthesize(
    raw_args: &[String],
    work_dir: &Path,
    project_dir: &Path,
    target: &Target,
) -> Result<SynthesizedArgs> {
    let mut args: Vec<String> = raw_args.to_vec();

    if args.is_empty() {
        args.push(work_dir.to_string_lossy().into_owned());
    }

    // A trailing `-o` has no value and would swallow the package argument
    // appended below, so it is rejected like a duplicate pair.
    if args.last().map(String::as_str) == Some("-o") {
        return Err(GberError::config_error(
            "-o is missing its value in build args",
        )
        .into());
    }

    // Normalize the package argument (conventionally the last element).
    let last = args.last().cloned().unwrap_or_default();
    if last == "." {
        let n = args.len();
        args[n - 1] = work_dir.to_string_lossy().into_owned();
    } else if last == ".." {
        let parent = work_dir.parent().unwrap_or(work_dir);
        let n = args.len();
        args[n - 1] = parent.to_string_lossy().into_owned();
    } else if !looks_like_path(&last) {
        args.push(work_dir.to_string_lossy().into_owned());
    }

    // Extract a user-declared output name. Only one -o pair is allowed; a
    // duplicate would leave an ambiguous vector, so it is rejected outright.
    let mut declared_name: Option<String> = None;
    let o_positions: Vec<usize> = args
        .iter()
        .enumerate()
        .filter(|(idx, arg)| arg.as_str() == "-o" && idx + 1 < args.len())
        .map(|(idx, _)| idx)
        .collect();
    match o_positions.as_slice() {
        [] => {}
        [idx] => {
            declared_name = Path::new(&args[idx + 1])
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            args.drain(*idx..=*idx + 1);
        }
        _ => {
            return Err(GberError::config_error(
                "multiple -o flags in build args; declare at most one output",
            )
            .into())
        }
    }

    let mut bin_name = match declared_name {
        Some(name) => name,
        None => {
            let pkg = args.last().map(String::as_str).unwrap_or_default();
            Path::new(pkg)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    GberError::config_error(format!(
                        "cannot derive a binary name from package argument '{}'",
                        pkg
                    ))
                })?
        }
    };

    if target.is_windows() && !bin_name.ends_with(WIN_SUFFIX) {
        bin_name.push_str(WIN_SUFFIX);
    }

    let bin_dir = project_dir.join("build").join(target.dir_name());
    ensure_dir(&bin_dir)?;
    let out_path = bin_dir.join(&bin_name).to_string_lossy().into_owned();

    // Insert `-o <path>` immediately before the package argument. With a
    // lone package argument it is prepended instead.
    if args.len() == 1 {
        args.insert(0, out_path);
        args.insert(0, "-o".to_string());
    } else {
        let pkg_idx = args.len() - 1;
        args.insert(pkg_idx, "-o".to_string());
        args.insert(pkg_idx + 1, out_path);
    }

    Ok(SynthesizedArgs {
        args,
        bin_dir,
        bin_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(pair: &str) -> Target {
        Target::parse(pair).unwrap()
    }

    fn run(
        raw: &[&str],
        work_dir: &Path,
        project_dir: &Path,
        pair: &str,
    ) -> Result<SynthesizedArgs> {
        let raw: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        synthesize(&raw, work_dir, project_dir, &target(pair))
    }

    #[test]
    fn ldflags_windows_scenario() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path();
        let synth = run(
            &["-ldflags", "-s -w", "./cmd/app"],
            proj,
            proj,
            "windows/amd64",
        )
        .unwrap();

        assert_eq!(synth.bin_name, "app.exe");
        let out = proj
            .join("build")
            .join("windows-amd64")
            .join("app.exe")
            .to_string_lossy()
            .into_owned();
        assert_eq!(
            synth.args,
            vec![
                "-ldflags".to_string(),
                "-s -w".to_string(),
                "-o".to_string(),
                out,
                "./cmd/app".to_string(),
            ]
        );
    }

    #[test]
    fn empty_args_default_to_work_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path().join("proj");
        std::fs::create_dir_all(&proj).unwrap();
        let synth = run(&[], &proj, &proj, "linux/amd64").unwrap();

        assert_eq!(synth.bin_name, "proj");
        assert_eq!(synth.args[0], "-o");
        assert_eq!(synth.args[2], proj.to_string_lossy());
        assert_eq!(synth.args.len(), 3);
    }

    #[test]
    fn dot_package_replaced_with_work_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path().join("myapp");
        std::fs::create_dir_all(&proj).unwrap();
        let synth = run(&["."], &proj, &proj, "linux/amd64").unwrap();

        assert_eq!(synth.bin_name, "myapp");
        assert_eq!(*synth.args.last().unwrap(), proj.to_string_lossy());
    }

    #[test]
    fn dotdot_package_replaced_with_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let parent = tmp.path().join("outer");
        let proj = parent.join("inner");
        std::fs::create_dir_all(&proj).unwrap();
        let synth = run(&[".."], &proj, &proj, "linux/amd64").unwrap();

        assert_eq!(synth.bin_name, "outer");
        assert_eq!(*synth.args.last().unwrap(), parent.to_string_lossy());
    }

    #[test]
    fn bare_flag_gets_work_dir_appended() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path().join("proj");
        std::fs::create_dir_all(&proj).unwrap();
        let synth = run(&["-trimpath"], &proj, &proj, "linux/amd64").unwrap();

        assert_eq!(*synth.args.last().unwrap(), proj.to_string_lossy());
        assert_eq!(synth.args[0], "-trimpath");
        assert_eq!(synth.bin_name, "proj");
    }

    #[test]
    fn declared_output_name_is_honored_and_relocated() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path();
        let synth = run(
            &["-o", "dist/tool", "./cmd/app"],
            proj,
            proj,
            "linux/arm64",
        )
        .unwrap();

        assert_eq!(synth.bin_name, "tool");
        // The declared pair was removed and re-inserted at the computed path.
        let o_count = synth.args.iter().filter(|a| a.as_str() == "-o").count();
        assert_eq!(o_count, 1);
        let out = synth.bin_dir.join("tool").to_string_lossy().into_owned();
        assert_eq!(
            synth.args,
            vec!["-o".to_string(), out, "./cmd/app".to_string()]
        );
    }

    #[test]
    fn duplicate_output_flags_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path();
        let err = run(
            &["-o", "a", "-o", "b", "./cmd/app"],
            proj,
            proj,
            "linux/amd64",
        )
        .unwrap_err();
        assert!(err.to_string().contains("multiple -o"));
    }

    #[test]
    fn dangling_output_flag_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path();
        let err = run(&["-v", "-o"], proj, proj, "linux/amd64").unwrap_err();
        assert!(err.to_string().contains("-o is missing its value"));

        let err = run(&["-o"], proj, proj, "linux/amd64").unwrap_err();
        assert!(err.to_string().contains("-o is missing its value"));
    }

    #[test]
    fn exactly_one_output_pair_before_package() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path();
        let synth = run(
            &["-v", "-trimpath", "-ldflags", "-s", "./cmd/app"],
            proj,
            proj,
            "linux/amd64",
        )
        .unwrap();

        let o_idx = synth.args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(o_idx + 2, synth.args.len() - 1);
        assert_eq!(*synth.args.last().unwrap(), "./cmd/app");
        assert_eq!(&synth.args[..3], &["-v", "-trimpath", "-ldflags"]);
    }

    #[test]
    fn windows_suffix_not_duplicated() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path();
        let synth = run(
            &["-o", "app.exe", "./cmd/app"],
            proj,
            proj,
            "windows/amd64",
        )
        .unwrap();
        assert_eq!(synth.bin_name, "app.exe");
    }

    #[test]
    fn output_directory_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path();
        let synth = run(&["./cmd/app"], proj, proj, "darwin/arm64").unwrap();
        assert!(synth.bin_dir.is_dir());
        assert_eq!(synth.bin_dir, proj.join("build").join("darwin-arm64"));
    }

    #[test]
    fn raw_args_are_not_mutated() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path();
        let raw: Vec<String> = vec!["-o".into(), "x".into(), "./cmd/app".into()];
        let before = raw.clone();
        let _ = synthesize(&raw, proj, proj, &target("linux/amd64")).unwrap();
        assert_eq!(raw, before);
    }
}
