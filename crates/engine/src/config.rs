//! Versioning configuration via `vstamp.toml`
//!
//! Controls how the model registry attaches the versioning plugin: whether
//! it is attached at all, which version field it stamps, and which
//! update-style operations it intercepts. Per-call options still override
//! the version key and can disable versioning for a single update.

use crate::hooks::OperationKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vstamp_core::error::{Error, Result};
use vstamp_core::options::{is_valid_version_key, DEFAULT_VERSION_KEY};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "vstamp.toml";

/// Versioning configuration loaded from `vstamp.toml`.
///
/// # Example
///
/// ```toml
/// enabled = true
/// version_key = "__v"
/// operations = ["findOneAndUpdate", "replaceOne", "update", "updateOne", "updateMany"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersioningConfig {
    /// Attach the versioning plugin to registered models.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Version field stamped when a query names none.
    #[serde(default = "default_version_key")]
    pub version_key: String,
    /// Operation names the plugin intercepts.
    #[serde(default = "default_operations")]
    pub operations: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_version_key() -> String {
    DEFAULT_VERSION_KEY.to_string()
}

fn default_operations() -> Vec<String> {
    OperationKind::ALL
        .iter()
        .map(|kind| kind.name().to_string())
        .collect()
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            version_key: default_version_key(),
            operations: default_operations(),
        }
    }
}

impl VersioningConfig {
    /// Parse the configured operation names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperation`] for a name the hook layer does not
    /// intercept.
    pub fn operation_kinds(&self) -> Result<Vec<OperationKind>> {
        let mut kinds = Vec::with_capacity(self.operations.len());
        for name in &self.operations {
            let kind: OperationKind = name.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }

    /// Check the version key and operation names.
    pub fn validate(&self) -> Result<()> {
        if self.version_key.is_empty() {
            return Err(Error::invalid_config("version_key cannot be empty"));
        }
        if !is_valid_version_key(&self.version_key) {
            return Err(Error::invalid_config(format!(
                "version_key '{}' must be a top-level field name",
                self.version_key
            )));
        }
        self.operation_kinds()?;
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# vstamp configuration
#
# Attach the update versioning plugin to registered models (default: true)
enabled = true

# Version field stamped by the plugin (default: "__v").
# A query's own versionKey option takes precedence.
version_key = "__v"

# Update-style operations the plugin intercepts.
# replaceOne always resets the version to 0.
operations = ["findOneAndUpdate", "replaceOne", "update", "updateOne", "updateMany"]
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VersioningConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
            tracing::info!(path = %path.display(), "wrote default versioning config");
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
