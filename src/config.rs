//! Build configuration: build/gbuild.json
//!
//! The build spec is a JSON document persisted beneath the project's build
//! directory. It is loaded once per run and treated as read-only; `gber
//! init` writes the initial template.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::build::target::{host_target, Target};
use crate::error::GberError;
use crate::utils::paths::ensure_dir;

pub const CONF_FILE_NAME: &str = "gbuild.json";

/// Signing credential bundle for osslsigncode
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignCredentials {
    pub pfx_file_path: String,
    pub pfx_password: String,
    pub pfx_company: String,
    pub pfx_website: String,
}

/// The build configuration for one project
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSpec {
    /// Working directory the compiler runs in (absolute)
    pub work_dir: PathBuf,

    /// Target `os/arch` pairs, built in order
    pub arch_os_list: Vec<String>,

    /// Raw user-supplied compiler arguments, order-significant
    pub build_args: Vec<String>,

    /// CGO cross-compilation through the zig toolchain
    pub enable_cgo: bool,

    /// Containerized CGO cross-compilation through xgo
    pub enable_xgo: bool,

    /// Obfuscate binaries with garble
    pub enable_garble: bool,

    /// Pack binaries with UPX
    pub enable_upx: bool,

    /// Sign windows binaries with osslsigncode
    pub enable_osslsigncode: bool,

    /// Zip binaries after the build
    pub enable_zip: bool,

    /// Signing credentials (used when enable_osslsigncode is set)
    #[serde(flatten)]
    pub sign: SignCredentials,

    /// xgo dependency spec (`-deps`)
    pub xgo_deps: String,

    /// xgo dependency build args (`-depsargs`)
    pub xgo_deps_args: String,

    /// xgo Docker image; empty means "discover from local images"
    pub xgo_image: String,
}

impl BuildSpec {
    /// Path of the configuration file for a project
    pub fn conf_path(project_dir: &Path) -> PathBuf {
        project_dir.join("build").join(CONF_FILE_NAME)
    }

    /// Load the configuration, if present
    pub fn load(project_dir: &Path) -> Result<Option<Self>> {
        let path = Self::conf_path(project_dir);
        if !path.is_file() {
            return Ok(None);
        }

        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let spec: Self = serde_json::from_str(&data).map_err(|e| {
            GberError::config_error(format!("invalid {}: {}", path.display(), e))
        })?;
        Ok(Some(spec))
    }

    /// Persist the configuration
    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let path = Self::conf_path(project_dir);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let data = serde_json::to_string_pretty(self).context("Failed to encode build spec")?;
        std::fs::write(&path, data)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Default template: the host's own target, zip enabled
    pub fn template(work_dir: PathBuf) -> Self {
        Self {
            work_dir,
            arch_os_list: vec![host_target()],
            enable_zip: true,
            ..Self::default()
        }
    }

    /// Parse and validate the configured targets
    pub fn parsed_targets(&self) -> Result<Vec<Target>> {
        self.arch_os_list
            .iter()
            .map(|pair| Target::parse(pair))
            .collect()
    }

    /// Validate the spec before any build is attempted
    pub fn validate(&self) -> Result<()> {
        if self.arch_os_list.is_empty() {
            return Err(GberError::config_error_with_hint(
                "no build targets configured",
                format!(
                    "add os/arch pairs to \"arch_os_list\" in build/{}",
                    CONF_FILE_NAME
                ),
            )
            .into());
        }
        self.parsed_targets()?;

        if self.enable_garble && (self.enable_cgo || self.enable_xgo) {
            return Err(GberError::config_error(
                "enable_garble cannot be combined with CGO builds: \
                 garble drives the compiler itself and is incompatible with \
                 external linking through zig or xgo",
            )
            .into());
        }
        if self.enable_cgo && self.enable_xgo {
            return Err(GberError::config_error(
                "enable_cgo and enable_xgo are mutually exclusive; \
                 pick the zig toolchain or the xgo container, not both",
            )
            .into());
        }

        if self.enable_osslsigncode
            && (self.sign.pfx_file_path.is_empty() || self.sign.pfx_password.is_empty())
        {
            return Err(GberError::config_error(
                "signing is enabled but pfx_file_path or pfx_password is missing",
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_spec() -> BuildSpec {
        BuildSpec {
            work_dir: PathBuf::from("/proj"),
            arch_os_list: vec!["linux/amd64".to_string(), "windows/amd64".to_string()],
            ..BuildSpec::default()
        }
    }

    #[test]
    fn json_roundtrip() {
        let mut spec = valid_spec();
        spec.enable_upx = true;
        spec.sign.pfx_company = "Example Corp".to_string();
        spec.xgo_image = "ghcr.io/crazy-max/xgo:latest".to_string();

        let json = serde_json::to_string_pretty(&spec).unwrap();
        let loaded: BuildSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, spec);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let spec: BuildSpec =
            serde_json::from_str(r#"{"arch_os_list": ["linux/amd64"]}"#).unwrap();
        assert!(!spec.enable_cgo);
        assert!(!spec.enable_zip);
        assert!(spec.build_args.is_empty());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = valid_spec();
        spec.save(tmp.path()).unwrap();
        assert!(BuildSpec::conf_path(tmp.path()).is_file());

        let loaded = BuildSpec::load(tmp.path()).unwrap().unwrap();
        assert_eq!(loaded, spec);
    }

    #[test]
    fn load_absent_config_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(BuildSpec::load(tmp.path()).unwrap().is_none());
    }

    #[test]
    fn empty_target_list_is_rejected() {
        let mut spec = valid_spec();
        spec.arch_os_list.clear();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("no build targets"));
    }

    #[test]
    fn malformed_target_is_rejected() {
        let mut spec = valid_spec();
        spec.arch_os_list.push("linux-amd64".to_string());
        assert!(spec.validate().is_err());
    }

    #[test]
    fn garble_and_cgo_are_mutually_exclusive() {
        let mut spec = valid_spec();
        spec.enable_garble = true;
        spec.enable_cgo = true;
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("enable_garble"));
    }

    #[test]
    fn cgo_and_xgo_are_mutually_exclusive() {
        let mut spec = valid_spec();
        spec.enable_cgo = true;
        spec.enable_xgo = true;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn signing_requires_credentials() {
        let mut spec = valid_spec();
        spec.enable_osslsigncode = true;
        assert!(spec.validate().is_err());

        spec.sign.pfx_file_path = "/certs/app.pfx".to_string();
        spec.sign.pfx_password = "secret".to_string();
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn template_targets_the_host() {
        let spec = BuildSpec::template(PathBuf::from("/proj"));
        assert_eq!(spec.arch_os_list.len(), 1);
        assert!(spec.enable_zip);
        assert!(spec.parsed_targets().is_ok());
    }
}
