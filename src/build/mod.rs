//! Build orchestration
//!
//! One [`Builder`] drives a whole run: for each configured target it
//! synthesizes the argument vector, selects a compiler strategy, resolves
//! injection tokens, launches the compiler with an explicit per-target
//! environment, and runs the post-build pipeline (UPX, osslsigncode, zip).
//!
//! Targets are built sequentially in configured order. A compiler failure
//! on any target aborts the whole run; skipped post-processing steps only
//! warn.

pub mod archive;
pub mod args;
pub mod cgo;
pub mod flags;
pub mod inject;
pub mod sign;
pub mod target;
pub mod upx;
pub mod xgo;

use std::path::{Path, PathBuf};

use anyhow::Result;
use console::style;

use crate::config::BuildSpec;
use crate::error::{hints, GberError};
use crate::exec::{run_command, ExecOptions};
use crate::utils::tools;

use args::SynthesizedArgs;
use cgo::ZigToolchain;
use target::Target;

/// Compiler strategy for one target. Strategies are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Plain `go build`
    Native,
    /// Obfuscated build through garble
    Obfuscated,
    /// CGO cross-compile through the zig toolchain
    ForeignC(ZigToolchain),
    /// Containerized cross-compile through xgo
    Containerized,
}

/// Orchestrates a multi-target build run
pub struct Builder {
    spec: BuildSpec,
    project_dir: PathBuf,
    work_dir: PathBuf,
    verbose: bool,
}

impl Builder {
    /// Create a builder from a validated spec
    pub fn new(spec: BuildSpec, project_dir: PathBuf, verbose: bool) -> Result<Self> {
        spec.validate()?;
        let work_dir = if spec.work_dir.as_os_str().is_empty() {
            project_dir.clone()
        } else {
            spec.work_dir.clone()
        };
        Ok(Self {
            spec,
            project_dir,
            work_dir,
            verbose,
        })
    }

    /// Build every configured target, in order
    pub fn build_all(&self) -> Result<()> {
        let go = tools::require_tool("go", "building")?;
        if self.verbose {
            if let Some(version) = &go.version {
                eprintln!("  using {}", version);
            }
        }
        check_work_dir(&self.work_dir)?;

        for target in self.spec.parsed_targets()? {
            self.build_target(&target)?;
        }
        Ok(())
    }

    /// Select the compiler strategy for one target.
    ///
    /// ForeignC was explicitly requested when enable_cgo is set, so an
    /// unsupported target or missing zig fails the run instead of falling
    /// back to a native build that would produce a subtly different binary.
    fn select_strategy(&self, target: &Target) -> Result<Strategy> {
        if self.spec.enable_xgo {
            if !xgo::is_xgo_installed() {
                return Err(
                    GberError::missing_tool("xgo", "containerized builds", hints::xgo()).into(),
                );
            }
            return Ok(Strategy::Containerized);
        }
        if self.spec.enable_cgo {
            return Ok(Strategy::ForeignC(cgo::require_zig_toolchain(target)?));
        }
        if self.spec.enable_garble {
            tools::ensure_garble()?;
            return Ok(Strategy::Obfuscated);
        }
        Ok(Strategy::Native)
    }

    /// Environment for the compiler subprocess: target selection plus
    /// whatever the strategy mandates. Built fresh per target, never global.
    fn compiler_env(&self, target: &Target, strategy: &Strategy) -> ExecOptions {
        let mut opts = ExecOptions::in_dir(&self.work_dir)
            .with_env("GOOS", &target.os)
            .with_env("GOARCH", &target.arch);
        match strategy {
            Strategy::ForeignC(toolchain) => {
                for (key, value) in &toolchain.env {
                    opts = opts.with_env(key, value);
                }
            }
            _ => {
                opts = opts.with_env("CGO_ENABLED", "0");
            }
        }
        opts
    }

    fn build_target(&self, target: &Target) -> Result<()> {
        eprintln!(
            "{} Building for {}...",
            style("→").cyan(),
            style(target).bold()
        );

        let synth = args::synthesize(
            &self.spec.build_args,
            &self.work_dir,
            &self.project_dir,
            target,
        )?;
        let strategy = self.select_strategy(target)?;

        match &strategy {
            Strategy::Containerized => self.run_xgo(target, &synth)?,
            _ => self.run_compiler(target, &synth, &strategy)?,
        }

        if self.spec.enable_upx {
            upx::pack(target, &synth.bin_dir, &synth.bin_name)?;
        }
        if self.spec.enable_osslsigncode {
            sign::sign(target, &synth.bin_dir, &synth.bin_name, &self.spec.sign)?;
        }
        if self.spec.enable_zip {
            eprintln!("{} Zipping binaries...", style("→").cyan());
            let zip_path = archive::zip_binary(target, &synth.bin_dir, &synth.bin_name)?;
            if self.verbose {
                eprintln!("  archive: {}", zip_path.display());
            }
        }

        eprintln!(
            "{} {} built: {}",
            style("✓").green(),
            target,
            synth.bin_dir.join(&synth.bin_name).display()
        );
        Ok(())
    }

    /// Run the native, obfuscated or zig-backed compiler
    fn run_compiler(
        &self,
        target: &Target,
        synth: &SynthesizedArgs,
        strategy: &Strategy,
    ) -> Result<()> {
        let mut cmd: Vec<String> = match strategy {
            Strategy::Obfuscated => ["garble", "-literals", "-tiny", "-seed=random", "build"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            _ => vec!["go".to_string(), "build".to_string()],
        };
        cmd.extend(synth.args.iter().cloned());

        if let Strategy::ForeignC(toolchain) = strategy {
            cmd = cgo::apply_cgo_flags(&cmd, toolchain);
        }

        inject::resolve_injections(&mut cmd, &self.work_dir);

        let program = cmd.remove(0);
        let opts = self.compiler_env(target, strategy);
        if self.verbose {
            eprintln!("  {} {}", program, cmd.join(" "));
        }

        let result = run_command(&program, &cmd, &opts, true)?;
        if !result.success {
            return Err(GberError::build_failure(
                target.to_string(),
                format!("{} exited with {}", program, result.exit_code),
            )
            .into());
        }
        Ok(())
    }

    /// Run the containerized build and normalize the artifact name
    fn run_xgo(&self, target: &Target, synth: &SynthesizedArgs) -> Result<()> {
        let image = xgo::resolve_image(&self.spec.xgo_image)?;
        let opts = xgo::XgoOptions {
            deps: non_empty(&self.spec.xgo_deps),
            deps_args: non_empty(&self.spec.xgo_deps_args),
            image,
            goproxy: std::env::var("GOPROXY").ok().and_then(|p| non_empty(&p)),
        };

        let mut cmd = xgo::translate(
            &synth.args,
            target,
            &synth.bin_dir,
            &synth.bin_name,
            &self.work_dir,
            &opts,
        );
        inject::resolve_injections(&mut cmd, &self.work_dir);

        if self.verbose {
            eprintln!("  xgo {}", cmd.join(" "));
        }

        let exec_opts = ExecOptions::in_dir(&self.work_dir);
        let result = run_command("xgo", &cmd, &exec_opts, true)?;
        if !result.success {
            return Err(GberError::build_failure(
                target.to_string(),
                format!("xgo exited with {}", result.exit_code),
            )
            .into());
        }

        xgo::fix_binary_name(&synth.bin_dir, &synth.bin_name, target)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check that a work dir path exists before launching subprocesses in it
pub fn check_work_dir(work_dir: &Path) -> Result<()> {
    if !work_dir.is_dir() {
        return Err(GberError::config_error(format!(
            "work_dir does not exist: {}",
            work_dir.display()
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with(f: impl FnOnce(&mut BuildSpec)) -> BuildSpec {
        let mut spec = BuildSpec {
            arch_os_list: vec!["linux/amd64".to_string()],
            ..BuildSpec::default()
        };
        f(&mut spec);
        spec
    }

    #[test]
    fn invalid_spec_is_rejected_at_construction() {
        let spec = spec_with(|s| s.arch_os_list.clear());
        assert!(Builder::new(spec, PathBuf::from("/proj"), false).is_err());
    }

    #[test]
    fn work_dir_defaults_to_project_dir() {
        let spec = spec_with(|_| {});
        let builder = Builder::new(spec, PathBuf::from("/proj"), false).unwrap();
        assert_eq!(builder.work_dir, PathBuf::from("/proj"));
    }

    #[test]
    fn native_strategy_by_default() {
        let spec = spec_with(|_| {});
        let builder = Builder::new(spec, PathBuf::from("/proj"), false).unwrap();
        let target = Target::parse("linux/amd64").unwrap();
        assert_eq!(builder.select_strategy(&target).unwrap(), Strategy::Native);
    }

    #[test]
    fn cgo_for_unsupported_target_is_fatal() {
        let spec = spec_with(|s| s.enable_cgo = true);
        let builder = Builder::new(spec, PathBuf::from("/proj"), false).unwrap();
        let target = Target::parse("windows/arm64").unwrap();
        assert!(builder.select_strategy(&target).is_err());
    }

    #[test]
    fn compiler_env_disables_cgo_for_native_builds() {
        let spec = spec_with(|_| {});
        let builder = Builder::new(spec, PathBuf::from("/proj"), false).unwrap();
        let target = Target::parse("windows/amd64").unwrap();
        let opts = builder.compiler_env(&target, &Strategy::Native);

        assert!(opts
            .env
            .iter()
            .any(|(k, v)| k == "GOOS" && v == "windows"));
        assert!(opts.env.iter().any(|(k, v)| k == "GOARCH" && v == "amd64"));
        assert!(opts
            .env
            .iter()
            .any(|(k, v)| k == "CGO_ENABLED" && v == "0"));
    }

    #[test]
    fn compiler_env_carries_zig_toolchain() {
        let spec = spec_with(|s| s.enable_cgo = true);
        let builder = Builder::new(spec, PathBuf::from("/proj"), false).unwrap();
        let target = Target::parse("linux/amd64").unwrap();
        let toolchain = cgo::zig_toolchain(&target).unwrap();
        let opts = builder.compiler_env(&target, &Strategy::ForeignC(toolchain));

        assert!(opts
            .env
            .iter()
            .any(|(k, v)| k == "CGO_ENABLED" && v == "1"));
        assert!(opts.env.iter().any(|(k, _)| k == "CC"));
        // CGO_ENABLED=0 must not also be present
        assert!(!opts
            .env
            .iter()
            .any(|(k, v)| k == "CGO_ENABLED" && v == "0"));
    }
}
