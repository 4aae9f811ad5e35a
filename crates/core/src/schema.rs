//! Document schemas and the precomputed schema path map
//!
//! A [`Schema`] describes the shape of the documents in one collection. It is
//! flattened once, at registration time, into a [`SchemaPathMap`]: a table
//! from dotted path to [`PathDescriptor`]. Update-time lookups are then plain
//! hash lookups keyed by the path string, with no traversal of the schema tree.
//!
//! Schemas can be built programmatically or parsed from the JSON shorthand
//! used by most document mappers:
//!
//! ```
//! use serde_json::json;
//! use vstamp_core::schema::{Schema, SchemaPathMap};
//!
//! let schema = Schema::from_definition(&json!({
//!     "name": "string",
//!     "tags": ["string"],
//!     "colors": [{ "hex": "string" }]
//! }))
//! .unwrap();
//!
//! let paths = SchemaPathMap::from_schema(&schema);
//! assert!(!paths.is_array_path("name"));
//! assert!(paths.is_array_path("tags"));
//! assert!(paths.is_array_path("colors.0.hex"));
//! ```

use crate::error::{Error, Result};
use crate::path::FieldPath;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Schema
// =============================================================================

/// Declared type of a schema field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// Any numeric value
    Number,
    /// Boolean
    Boolean,
    /// Date / timestamp
    Date,
    /// Document identifier
    ObjectId,
    /// Untyped value; paths below it are not tracked
    Mixed,
    /// Embedded sub-document
    Document(Schema),
    /// Array of the element type
    Array(Box<FieldType>),
}

impl FieldType {
    /// Shorthand for `FieldType::Array(Box::new(element))`
    pub fn array(element: FieldType) -> Self {
        FieldType::Array(Box::new(element))
    }

    /// Whether values of this type are arrays
    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array(_))
    }

    fn from_name(name: &str) -> Option<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" | "bool" => FieldType::Boolean,
            "date" => FieldType::Date,
            "objectid" => FieldType::ObjectId,
            "mixed" | "any" => FieldType::Mixed,
            "array" => FieldType::array(FieldType::Mixed),
            _ => return None,
        };
        Some(ty)
    }
}

/// Ordered set of named, typed fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<(String, FieldType)>,
}

impl Schema {
    /// Start building a schema field by field
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Parse a schema from its JSON shorthand definition
    ///
    /// - `"string"`, `"number"`, `"boolean"`, `"date"`, `"objectid"`,
    ///   `"mixed"`: scalar types (case-insensitive)
    /// - `[T]`: array of `T`; `[]` is an array of mixed values
    /// - `{ "type": T, ... }`: explicit declaration, extra keys ignored
    /// - any other object: embedded sub-document
    pub fn from_definition(definition: &Value) -> Result<Self> {
        let obj = definition
            .as_object()
            .ok_or_else(|| Error::invalid_schema("schema definition must be an object"))?;

        let mut builder = Schema::builder();
        for (name, value) in obj {
            let ty = parse_field_type(name, value)?;
            builder = builder.field(name.clone(), ty);
        }
        builder.build()
    }

    /// Declared fields in definition order
    pub fn fields(&self) -> &[(String, FieldType)] {
        &self.fields
    }

    /// Look up a top-level field by name
    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }
}

fn parse_field_type(name: &str, value: &Value) -> Result<FieldType> {
    match value {
        Value::String(type_name) => FieldType::from_name(type_name).ok_or_else(|| {
            Error::invalid_schema(format!("unknown type '{}' for field '{}'", type_name, name))
        }),
        Value::Array(items) => match items.as_slice() {
            [] => Ok(FieldType::array(FieldType::Mixed)),
            [element] => Ok(FieldType::array(parse_field_type(name, element)?)),
            _ => Err(Error::invalid_schema(format!(
                "array field '{}' must declare exactly one element type",
                name
            ))),
        },
        Value::Object(map) => match map.get("type") {
            Some(declared @ (Value::String(_) | Value::Array(_))) => {
                parse_field_type(name, declared)
            }
            _ => Ok(FieldType::Document(Schema::from_definition(value)?)),
        },
        other => Err(Error::invalid_schema(format!(
            "field '{}' has unsupported definition {}",
            name, other
        ))),
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, FieldType)>,
}

impl SchemaBuilder {
    /// Declare a field
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    /// Validate field names and produce the schema
    pub fn build(self) -> Result<Schema> {
        for (i, (name, _)) in self.fields.iter().enumerate() {
            validate_field_name(name)?;
            if self.fields[..i].iter().any(|(n, _)| n == name) {
                return Err(Error::DuplicateField(name.clone()));
            }
        }
        Ok(Schema {
            fields: self.fields,
        })
    }
}

/// Field names must be non-empty, dot-free and must not look like operators
pub fn validate_field_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_schema("field name cannot be empty"));
    }
    if name.contains('.') {
        return Err(Error::invalid_schema(format!(
            "field name '{}' cannot contain '.'",
            name
        )));
    }
    if name.starts_with('$') {
        return Err(Error::invalid_schema(format!(
            "field name '{}' cannot start with '$'",
            name
        )));
    }
    Ok(())
}

// =============================================================================
// SchemaPathMap
// =============================================================================

/// Shape of the value stored at a schema path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// Scalar or mixed value
    Scalar,
    /// Embedded sub-document
    Document,
    /// Array of scalars (or of nested arrays)
    Array,
    /// Array of embedded sub-documents
    DocumentArray,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PathKind::Scalar => "scalar",
            PathKind::Document => "document",
            PathKind::Array => "array",
            PathKind::DocumentArray => "document array",
        };
        f.write_str(name)
    }
}

/// Type descriptor for one schema path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDescriptor {
    path: String,
    kind: PathKind,
    within_array: bool,
}

impl PathDescriptor {
    /// Dotted path this descriptor was registered under
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Shape of the value at this path
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// Whether the value at this path is an array
    pub fn is_array(&self) -> bool {
        matches!(self.kind, PathKind::Array | PathKind::DocumentArray)
    }

    /// Whether this path lives inside the elements of a document array
    pub fn is_within_array(&self) -> bool {
        self.within_array
    }
}

/// Precomputed dotted-path → descriptor table for a schema
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaPathMap {
    paths: HashMap<String, PathDescriptor>,
}

impl SchemaPathMap {
    /// Flatten a schema into its path map
    pub fn from_schema(schema: &Schema) -> Self {
        let mut paths = HashMap::new();
        collect_paths(schema, "", false, &mut paths);
        SchemaPathMap { paths }
    }

    /// Exact lookup by schema key (no array positions, no ancestor fallback)
    pub fn get(&self, path: &str) -> Option<&PathDescriptor> {
        self.paths.get(path)
    }

    /// Resolve a path as an update would address it
    ///
    /// Digit segments after an array are positions and are ignored; a path
    /// below an array resolves to its nearest array-typed ancestor
    /// (`colors.0.hex` → `colors`). Digit segments anywhere else are field
    /// names, so a field called `2024` resolves to itself.
    pub fn resolve(&self, path: &FieldPath) -> Option<&PathDescriptor> {
        let keys = path.schema_keys(|prefix| self.is_array_key(prefix));
        let exact = self.paths.get(&keys.join("."));
        if exact.is_some_and(PathDescriptor::is_array) {
            return exact;
        }
        (1..keys.len())
            .rev()
            .find_map(|n| self.paths.get(&keys[..n].join(".")).filter(|d| d.is_array()))
            .or(exact)
    }

    /// Parse and resolve a raw dotted path
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] when `path` is not a valid dotted path.
    pub fn try_resolve(&self, path: &str) -> Result<Option<&PathDescriptor>> {
        let parsed: FieldPath = path.parse()?;
        Ok(self.resolve(&parsed))
    }

    /// Resolve a raw dotted path; unparseable paths resolve to nothing
    pub fn resolve_str(&self, path: &str) -> Option<&PathDescriptor> {
        self.try_resolve(path).ok().flatten()
    }

    /// Whether an assignment to `path` replaces or reaches into an array
    pub fn is_array_path(&self, path: &str) -> bool {
        self.resolve_str(path).is_some_and(PathDescriptor::is_array)
    }

    /// Number of registered paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no paths are registered
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn is_array_key(&self, key: &str) -> bool {
        self.paths.get(key).is_some_and(PathDescriptor::is_array)
    }
}

impl From<&Schema> for SchemaPathMap {
    fn from(schema: &Schema) -> Self {
        SchemaPathMap::from_schema(schema)
    }
}

fn collect_paths(
    schema: &Schema,
    prefix: &str,
    within_array: bool,
    out: &mut HashMap<String, PathDescriptor>,
) {
    for (name, ty) in schema.fields() {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        let kind = match ty {
            FieldType::Document(sub) => {
                collect_paths(sub, &path, within_array, out);
                PathKind::Document
            }
            FieldType::Array(element) => match element.as_ref() {
                FieldType::Document(sub) => {
                    collect_paths(sub, &path, true, out);
                    PathKind::DocumentArray
                }
                _ => PathKind::Array,
            },
            _ => PathKind::Scalar,
        };

        out.insert(
            path.clone(),
            PathDescriptor {
                path,
                kind,
                within_array,
            },
        );
    }
}
