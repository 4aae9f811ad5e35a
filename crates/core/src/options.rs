//! Per-call versioning options
//!
//! Deserializes from the same option record the store's query options use,
//! so `{ "version": false }` or `{ "versionKey": "rev" }` can be passed
//! straight through. Unrelated query options are ignored.

use crate::update::is_operator_key;
use serde::{Deserialize, Serialize};

/// Field name used for the version counter unless overridden
pub const DEFAULT_VERSION_KEY: &str = "__v";

/// Whether `key` can name the version field
///
/// It must be a non-empty top-level field name; a dotted path or an
/// operator name (`$inc`) would clobber other parts of the payload.
pub fn is_valid_version_key(key: &str) -> bool {
    !key.is_empty() && !key.contains('.') && !is_operator_key(key)
}

/// Options recognized by the version rewriter
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vstamp_core::options::VersioningOptions;
///
/// let opts: VersioningOptions =
///     serde_json::from_value(json!({ "new": true, "versionKey": "rev" })).unwrap();
/// assert!(opts.version);
/// assert!(!opts.overwrite);
/// assert_eq!(opts.version_key(), "rev");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersioningOptions {
    /// `false` disables versioning for this call
    #[serde(default = "default_version")]
    pub version: bool,
    /// The update replaces the whole document
    #[serde(default)]
    pub overwrite: bool,
    /// Version field name; [`DEFAULT_VERSION_KEY`] when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_key: Option<String>,
}

fn default_version() -> bool {
    true
}

impl Default for VersioningOptions {
    fn default() -> Self {
        Self {
            version: default_version(),
            overwrite: false,
            version_key: None,
        }
    }
}

impl VersioningOptions {
    /// Options with versioning turned off
    pub fn disabled() -> Self {
        Self {
            version: false,
            ..Self::default()
        }
    }

    /// Mark the update as a whole-document replacement
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Use a custom version field name
    pub fn with_version_key(mut self, key: impl Into<String>) -> Self {
        self.version_key = Some(key.into());
        self
    }

    /// The effective version field name
    pub fn version_key(&self) -> &str {
        self.version_key.as_deref().unwrap_or(DEFAULT_VERSION_KEY)
    }
}
