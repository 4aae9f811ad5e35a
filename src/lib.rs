//! vstamp - optimistic-concurrency version stamping for update payloads
//!
//! vstamp sits between an application and a document store. Before an
//! update-style operation is dispatched, it rewrites the update payload so
//! that:
//!
//! - the version counter (`__v` by default) is incremented whenever the
//!   update could disturb the contents of an array field
//! - a whole-document replacement resets the version to 0
//! - the payload can never write the version field directly
//!
//! # Quick Start
//!
//! ```
//! use serde_json::json;
//! use vstamp::{ModelRegistry, OperationKind, Schema, UpdateQuery, UpdateSpec};
//!
//! let registry = ModelRegistry::new();
//! let schema = Schema::from_definition(&json!({
//!     "name": "string",
//!     "colors": [{ "name": "string" }]
//! }))
//! .unwrap();
//! registry.register("Toy", &schema).unwrap();
//!
//! let update = UpdateSpec::from_value(json!({ "$push": { "colors": { "name": "gold" } } })).unwrap();
//! let mut query = UpdateQuery::new(OperationKind::FindOneAndUpdate, update);
//! registry.before_update("Toy", &mut query).unwrap();
//!
//! assert_eq!(query.update["$inc"], json!({ "__v": 1 }));
//! ```
//!
//! # Architecture
//!
//! `vstamp-core` holds the data model (paths, schemas, payloads, options);
//! `vstamp-engine` holds the classifier, the rewriter and the hook layer.
//! This crate re-exports both.

pub use vstamp_core::*;
pub use vstamp_engine::*;
