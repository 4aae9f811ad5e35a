//! Update versioning engine for vstamp
//!
//! Rewrites partial-update payloads so that the document version counter is
//! incremented whenever an update could disturb array contents, and so that
//! a payload can never write the version field directly.
//!
//! - [`classifier`]: does an update touch an array-typed path?
//! - [`rewriter`]: strip forged version writes, inject `$inc` or reset to 0
//! - [`hooks`]: pre-update hook layer and the versioning plugin
//! - [`registry`]: model name → schema path map + hooks
//! - [`config`]: `vstamp.toml`
//!
//! The rewriter is pure and synchronous: it borrows one payload for one call
//! and keeps no state, so it can run on any number of threads at once as long
//! as each call gets its own payload.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod config;
pub mod hooks;
pub mod registry;
pub mod rewriter;

pub use classifier::touches_array;
pub use config::{VersioningConfig, CONFIG_FILE_NAME};
pub use hooks::{OperationKind, PreUpdateHook, UpdateQuery, UpdateVersioningPlugin};
pub use registry::ModelRegistry;
pub use rewriter::{apply_versioning, apply_versioning_outcome, VersionOutcome};
