//! Pipeline configuration
//!
//! ```toml
//! store_root = "var/infergov"
//! policy_path = "policy.toml"     # optional, baseline matrix when absent
//! logging_profile = "production"  # development | production | test
//! ```
//!
//! Relative paths in a file loaded with [`PipelineConfig::from_path`] are
//! resolved against that file's directory.

use std::path::{Path, PathBuf};

use infergov_core::errors::{GovError, GovErrorKind, Result};
use infergov_core::logging_facility::Profile;
use infergov_core::policy::PolicyMatrix;
use infergov_store::ArtifactStore;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub store_root: PathBuf,
    #[serde(default)]
    pub policy_path: Option<PathBuf>,
    #[serde(default)]
    pub logging_profile: Profile,
}

impl PipelineConfig {
    /// Config with the baseline policy and the default logging profile
    pub fn with_store_root(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
            policy_path: None,
            logging_profile: Profile::default(),
        }
    }

    /// # Errors
    ///
    /// `InvalidConfig` when the text is not valid TOML for this shape.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| invalid_config(e.to_string()))
    }

    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidConfig` if it does not parse.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GovError::new(GovErrorKind::Io)
                .with_op("config_load")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            config.store_root = dir.join(&config.store_root);
            config.policy_path = config.policy_path.map(|p| dir.join(p));
        }
        Ok(config)
    }

    /// The configured matrix, or [`PolicyMatrix::baseline`] when none is set
    ///
    /// # Errors
    ///
    /// `Io` if the policy file cannot be read, `InvalidConfig` if it fails
    /// to parse or validate.
    pub fn load_policy(&self) -> Result<PolicyMatrix> {
        let Some(path) = &self.policy_path else {
            return Ok(PolicyMatrix::baseline());
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            GovError::new(GovErrorKind::Io)
                .with_op("policy_load")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        PolicyMatrix::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// Propagates [`ArtifactStore::open`] failures.
    pub fn open_store(&self) -> Result<ArtifactStore> {
        ArtifactStore::open(self.store_root.clone())
    }
}

fn invalid_config(message: String) -> GovError {
    GovError::new(GovErrorKind::InvalidConfig)
        .with_op("config_load")
        .with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = PipelineConfig::from_toml_str(r#"store_root = "/var/infergov""#).unwrap();
        assert_eq!(config.store_root, PathBuf::from("/var/infergov"));
        assert_eq!(config.policy_path, None);
        assert_eq!(config.logging_profile, Profile::Development);
        assert_eq!(config.load_policy().unwrap(), PolicyMatrix::baseline());
    }

    #[test]
    fn test_full_config_parses() {
        let config = PipelineConfig::from_toml_str(
            r#"
store_root = "store"
policy_path = "policy.toml"
logging_profile = "production"
"#,
        )
        .unwrap();
        assert_eq!(config.policy_path, Some(PathBuf::from("policy.toml")));
        assert_eq!(config.logging_profile, Profile::Production);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PipelineConfig::from_toml_str("store_root = \"s\"\nstorage = \"x\"").unwrap_err();
        assert!(err.is(GovErrorKind::InvalidConfig));
    }

    #[test]
    fn test_missing_store_root_rejected() {
        let err = PipelineConfig::from_toml_str("logging_profile = \"test\"").unwrap_err();
        assert!(err.is(GovErrorKind::InvalidConfig));
    }

    #[test]
    fn test_from_path_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("infergov.toml");
        std::fs::write(&config_path, "store_root = \"store\"\npolicy_path = \"policy.toml\"\n")
            .unwrap();

        let config = PipelineConfig::from_path(&config_path).unwrap();
        assert_eq!(config.store_root, dir.path().join("store"));
        assert_eq!(config.policy_path, Some(dir.path().join("policy.toml")));
    }

    #[test]
    fn test_missing_policy_file_is_io_error() {
        let mut config = PipelineConfig::with_store_root("s");
        config.policy_path = Some(PathBuf::from("/nonexistent/infergov/policy.toml"));
        let err = config.load_policy().unwrap_err();
        assert!(err.is(GovErrorKind::Io));
    }
}
