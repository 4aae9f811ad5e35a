//! Pre-update hooks
//!
//! The store runs registered hooks synchronously before dispatching an
//! update-style operation. [`UpdateVersioningPlugin`] is the hook that runs
//! the version rewriter: it copies the operation's options, forces
//! `overwrite` for whole-document replacement, and rewrites the payload in
//! place so the store forwards the stamped version.

use crate::rewriter::{apply_versioning_outcome, VersionOutcome};
use std::fmt;
use std::str::FromStr;
use vstamp_core::error::Error;
use vstamp_core::options::{is_valid_version_key, VersioningOptions};
use vstamp_core::schema::SchemaPathMap;
use vstamp_core::update::UpdateSpec;

/// Update-style operations a hook can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Find a document, apply an update, return it
    FindOneAndUpdate,
    /// Replace a whole document
    ReplaceOne,
    /// Generic update
    Update,
    /// Update the first matching document
    UpdateOne,
    /// Update every matching document
    UpdateMany,
}

impl OperationKind {
    /// Every operation kind, in registration order
    pub const ALL: [OperationKind; 5] = [
        OperationKind::FindOneAndUpdate,
        OperationKind::ReplaceOne,
        OperationKind::Update,
        OperationKind::UpdateOne,
        OperationKind::UpdateMany,
    ];

    /// Operation name as the store reports it
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::FindOneAndUpdate => "findOneAndUpdate",
            OperationKind::ReplaceOne => "replaceOne",
            OperationKind::Update => "update",
            OperationKind::UpdateOne => "updateOne",
            OperationKind::UpdateMany => "updateMany",
        }
    }

    /// Whether the payload of this operation replaces the whole document
    pub fn forces_overwrite(&self) -> bool {
        matches!(self, OperationKind::ReplaceOne)
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An intercepted update-style operation
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    /// Which operation is about to run
    pub kind: OperationKind,
    /// Payload the store will send; hooks rewrite it in place
    pub update: UpdateSpec,
    /// The operation's own options
    pub options: VersioningOptions,
}

impl UpdateQuery {
    /// Intercept an operation with default options
    pub fn new(kind: OperationKind, update: UpdateSpec) -> Self {
        Self {
            kind,
            update,
            options: VersioningOptions::default(),
        }
    }

    /// Replace the operation's options
    pub fn with_options(mut self, options: VersioningOptions) -> Self {
        self.options = options;
        self
    }
}

/// Hook run before an update-style operation is dispatched
pub trait PreUpdateHook: Send + Sync {
    /// Inspect and rewrite the query payload
    fn before_update(&self, query: &mut UpdateQuery, schema_paths: &SchemaPathMap)
        -> VersionOutcome;
}

/// Hook that stamps version changes into update payloads
#[derive(Debug, Clone, Default)]
pub struct UpdateVersioningPlugin {
    version_key: Option<String>,
}

impl UpdateVersioningPlugin {
    /// Plugin using the query's version key, or the default one
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugin that supplies `key` when the query names no version key
    pub fn with_version_key(key: impl Into<String>) -> Self {
        Self {
            version_key: Some(key.into()),
        }
    }

    /// Options the rewriter sees for `query`
    ///
    /// A version key that is not a plain field name is ignored with a
    /// warning, falling back to the plugin's key and then the default.
    pub fn effective_options(&self, query: &UpdateQuery) -> VersioningOptions {
        let mut options = query.options.clone();
        if query.kind.forces_overwrite() {
            options.overwrite = true;
        }
        options.version_key = [options.version_key.take(), self.version_key.clone()]
            .into_iter()
            .flatten()
            .find(|key| {
                let valid = is_valid_version_key(key);
                if !valid {
                    tracing::warn!(version_key = %key, "ignoring invalid version key");
                }
                valid
            });
        options
    }
}

impl PreUpdateHook for UpdateVersioningPlugin {
    fn before_update(
        &self,
        query: &mut UpdateQuery,
        schema_paths: &SchemaPathMap,
    ) -> VersionOutcome {
        let options = self.effective_options(query);
        let outcome = apply_versioning_outcome(&mut query.update, &options, schema_paths);
        tracing::trace!(operation = %query.kind, ?outcome, "versioning hook ran");
        outcome
    }
}
