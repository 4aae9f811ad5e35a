//! Update classifier: does an update touch an array-typed path?
//!
//! Two ways an update reaches into an array:
//! - an array-mutation operator (`$push`, `$pull`, `$addToSet`, `$pop`,
//!   `$pullAll`) naming at least one path; these are only legal against
//!   arrays, so no schema lookup is needed
//! - a literal assignment (`$set` or a bare field) whose path resolves to an
//!   array-typed descriptor, directly or through an array ancestor
//!
//! Everything else, including operators the engine does not know, is
//! treated as leaving array contents alone.

use vstamp_core::schema::SchemaPathMap;
use vstamp_core::update::UpdateSpec;

/// Whether `update` could disturb the contents of an array field
pub fn touches_array(update: &UpdateSpec, schema_paths: &SchemaPathMap) -> bool {
    if let Some(op) = array_mutation(update) {
        tracing::trace!(operator = %op, "array mutation operator present");
        return true;
    }

    match update
        .assignments()
        .find(|(path, _)| schema_paths.is_array_path(path))
    {
        Some((path, _)) => {
            tracing::trace!(path, "assignment replaces array path");
            true
        }
        None => false,
    }
}

/// First array-mutation operator that names at least one path
fn array_mutation(update: &UpdateSpec) -> Option<vstamp_core::UpdateOperator> {
    update
        .operators()
        .find(|(op, fields)| op.is_array_mutation() && !fields.is_empty())
        .map(|(op, _)| op)
}
