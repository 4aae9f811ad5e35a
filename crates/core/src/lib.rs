//! Core types for vstamp
//!
//! This crate defines the data model the version rewriter works on:
//! - FieldPath: dotted path into a document (`colors.0.hex`)
//! - Schema / SchemaPathMap: declared document shape and its flattened
//!   path → type descriptor table
//! - UpdateSpec / UpdateOperator: partial-update payloads
//! - VersioningOptions: per-call options (`version`, `overwrite`, `versionKey`)
//! - Error: error type for the glue around the rewriter

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod options;
pub mod path;
pub mod schema;
pub mod update;

pub use error::{Error, Result};
pub use options::{is_valid_version_key, VersioningOptions, DEFAULT_VERSION_KEY};
pub use path::{FieldPath, PathParseError, PathSegment};
pub use schema::{FieldType, PathDescriptor, PathKind, Schema, SchemaBuilder, SchemaPathMap};
pub use update::{is_operator_key, UpdateOperator, UpdateSpec, OPERATOR_PREFIX};
