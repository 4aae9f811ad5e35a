//! Version rewriter
//!
//! Entry point of the engine. One call inspects one update payload and
//! rewrites it in place:
//!
//! ```text
//! disabled? -> strip forged version writes -> overwrite? -> array touched? -> done
//! ```
//!
//! Terminal outcomes:
//! - [`VersionOutcome::Disabled`]: `version: false`, payload untouched
//! - [`VersionOutcome::Reset`]: whole-document replacement, version set to 0
//! - [`VersionOutcome::Incremented`]: `$inc` of the version key by 1 injected
//! - [`VersionOutcome::Unchanged`]: no version change (stripping still applies)
//!
//! The payload is borrowed for the duration of the call only.

use crate::classifier::touches_array;
use serde_json::Value;
use tracing::{debug, trace, warn};
use vstamp_core::options::VersioningOptions;
use vstamp_core::schema::SchemaPathMap;
use vstamp_core::update::{UpdateOperator, UpdateSpec};

/// What a rewrite did to the version field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionOutcome {
    /// Versioning was disabled for this call; nothing was touched
    Disabled,
    /// No version change was applied
    Unchanged,
    /// An increment of the version field was injected
    Incremented,
    /// The version field was reset to zero for a replacement
    Reset,
}

impl VersionOutcome {
    /// Whether the version field will change
    pub fn changed(&self) -> bool {
        matches!(self, VersionOutcome::Incremented | VersionOutcome::Reset)
    }
}

/// Stamp `update` with a version change if it touches an array field
///
/// Returns whether a version change was applied. See
/// [`apply_versioning_outcome`] for the detailed result.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vstamp_core::{Schema, SchemaPathMap, UpdateSpec, VersioningOptions};
/// use vstamp_engine::apply_versioning;
///
/// let schema = Schema::from_definition(&json!({
///     "name": "string",
///     "colors": [{ "name": "string" }]
/// }))
/// .unwrap();
/// let paths = SchemaPathMap::from_schema(&schema);
///
/// let mut update = UpdateSpec::from_value(json!({
///     "$push": { "colors": { "name": "gold" } }
/// }))
/// .unwrap();
/// assert!(apply_versioning(&mut update, &VersioningOptions::default(), &paths));
/// assert_eq!(
///     update.into_value(),
///     json!({ "$push": { "colors": { "name": "gold" } }, "$inc": { "__v": 1 } })
/// );
/// ```
pub fn apply_versioning(
    update: &mut UpdateSpec,
    options: &VersioningOptions,
    schema_paths: &SchemaPathMap,
) -> bool {
    apply_versioning_outcome(update, options, schema_paths).changed()
}

/// Stamp `update` and report which terminal outcome was reached
pub fn apply_versioning_outcome(
    update: &mut UpdateSpec,
    options: &VersioningOptions,
    schema_paths: &SchemaPathMap,
) -> VersionOutcome {
    if !options.version {
        debug!("versioning disabled for this update");
        return VersionOutcome::Disabled;
    }

    let version_key = options.version_key();
    if update.remove_assignment(version_key) {
        trace!(version_key, "stripped direct write to version key");
    }

    if options.overwrite {
        remove_increment(update, version_key);
        update.insert(version_key.to_string(), Value::from(0));
        debug!(version_key, "replacement resets version");
        return VersionOutcome::Reset;
    }

    if !touches_array(update, schema_paths) {
        debug!(version_key, "update leaves arrays alone, version unchanged");
        return VersionOutcome::Unchanged;
    }

    let (increments, replaced) = update.operator_entry(UpdateOperator::Inc);
    if replaced {
        warn!(
            version_key,
            "replaced non-object {} operand to inject version increment",
            UpdateOperator::Inc
        );
    }
    increments.insert(version_key.to_string(), Value::from(1));
    debug!(version_key, "array update increments version");
    VersionOutcome::Incremented
}

/// Drop a caller-supplied `$inc` of the version key, and `$inc` if emptied
fn remove_increment(update: &mut UpdateSpec, version_key: &str) {
    let emptied = match update.operator_mut(UpdateOperator::Inc) {
        Some(increments) => increments.shift_remove(version_key).is_some() && increments.is_empty(),
        None => false,
    };
    if emptied {
        update.shift_remove(UpdateOperator::Inc.name());
    }
}
