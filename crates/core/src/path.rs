//! Dotted field paths
//!
//! Update operators name their targets with dotted paths such as `name`,
//! `colors.hex`, `colors.0.hex` or `colors.$[].hex`. This module parses those
//! strings into segments so the schema lookup can ignore array positions.
//!
//! # Path Syntax
//!
//! | Syntax | Segment | Example |
//! |--------|---------|---------|
//! | `key` | [`PathSegment::Key`] | `colors` |
//! | digits | [`PathSegment::Index`] | `colors.0` |
//! | `$`, `$[]`, `$[id]` | [`PathSegment::Positional`] | `colors.$.hex` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for field path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// The path string was empty
    #[error("empty field path")]
    Empty,
    /// Empty segment between dots (e.g. `a..b`, `.a`, `a.`)
    #[error("empty segment in path at position {0}")]
    EmptySegment(usize),
    /// A `$[` positional segment without its closing bracket
    #[error("unclosed positional bracket in segment '{0}'")]
    UnclosedBracket(String),
}

/// A segment in a dotted field path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Document field name
    Key(String),
    /// Numeric array position: `colors.0`
    Index(usize),
    /// Positional operator: `$`, `$[]` or `$[identifier]`
    Positional(String),
}

impl PathSegment {
    /// Whether this segment addresses an array element rather than a field
    pub fn is_array_position(&self) -> bool {
        matches!(self, PathSegment::Index(_) | PathSegment::Positional(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Positional(p) => write!(f, "{}", p),
        }
    }
}

/// A parsed dotted path into a document
///
/// # Examples
///
/// ```
/// use vstamp_core::path::FieldPath;
///
/// let path: FieldPath = "colors.0.hex".parse().unwrap();
/// assert_eq!(path.len(), 3);
///
/// let keys = path.schema_keys(|prefix| prefix == "colors");
/// assert_eq!(keys, vec!["colors".to_string(), "hex".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        FieldPath { segments }
    }

    /// Create a single-segment path for a top-level field
    pub fn field(name: impl Into<String>) -> Self {
        FieldPath {
            segments: vec![PathSegment::Key(name.into())],
        }
    }

    /// Append a key segment (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether any segment addresses an array element
    pub fn has_array_position(&self) -> bool {
        self.segments.iter().any(PathSegment::is_array_position)
    }

    /// Field names along this path, with array positions dropped
    ///
    /// `is_array` is asked about the schema key built so far whenever a
    /// digit segment follows it. After an array the digits are a position;
    /// anywhere else they are a field name (`2024`, `stats.0`). Positional
    /// operators are always dropped.
    pub fn schema_keys(&self, is_array: impl Fn(&str) -> bool) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(self.segments.len());
        for seg in &self.segments {
            match seg {
                PathSegment::Key(k) => keys.push(k.clone()),
                PathSegment::Index(i) => {
                    if keys.is_empty() || !is_array(&keys.join(".")) {
                        keys.push(i.to_string());
                    }
                }
                PathSegment::Positional(_) => {}
            }
        }
        keys
    }

    /// Render back to dotted notation
    pub fn to_path_string(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathParseError::Empty);
        }

        let mut segments = Vec::new();
        let mut position = 0;
        for raw in s.split('.') {
            if raw.is_empty() {
                return Err(PathParseError::EmptySegment(position));
            }
            position += raw.len() + 1;

            let segment = if raw == "$" {
                PathSegment::Positional(raw.to_string())
            } else if let Some(rest) = raw.strip_prefix("$[") {
                if !rest.ends_with(']') {
                    return Err(PathParseError::UnclosedBracket(raw.to_string()));
                }
                PathSegment::Positional(raw.to_string())
            } else if raw.bytes().all(|b| b.is_ascii_digit()) {
                // Digit runs too long for usize are still positions
                match raw.parse::<usize>() {
                    Ok(idx) => PathSegment::Index(idx),
                    Err(_) => PathSegment::Positional(raw.to_string()),
                }
            } else {
                PathSegment::Key(raw.to_string())
            };
            segments.push(segment);
        }

        Ok(FieldPath { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_key() {
        let path: FieldPath = "name".parse().unwrap();
        assert_eq!(path, FieldPath::field("name"));
        assert_eq!(path.schema_keys(|_| false), vec!["name".to_string()]);
    }

    #[test]
    fn test_parse_nested_keys() {
        let path: FieldPath = "colors.hex".parse().unwrap();
        assert_eq!(path, FieldPath::field("colors").key("hex"));
        assert!(!path.has_array_position());
    }

    #[test]
    fn test_parse_index_segment() {
        let path: FieldPath = "colors.0.hex".parse().unwrap();
        assert_eq!(path, FieldPath::field("colors").index(0).key("hex"));
        assert!(path.has_array_position());
        assert_eq!(path.schema_keys(|_| true).join("."), "colors.hex");
    }

    #[test]
    fn test_parse_positional_segments() {
        for raw in ["colors.$.hex", "colors.$[].hex", "colors.$[elem].hex"] {
            let path: FieldPath = raw.parse().unwrap();
            assert!(matches!(path.segments()[1], PathSegment::Positional(_)));
            assert_eq!(path.schema_keys(|_| false).join("."), "colors.hex");
            assert_eq!(path.to_path_string(), raw);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<FieldPath>(), Err(PathParseError::Empty));
        assert_eq!(
            "a..b".parse::<FieldPath>(),
            Err(PathParseError::EmptySegment(2))
        );
        assert_eq!(
            ".a".parse::<FieldPath>(),
            Err(PathParseError::EmptySegment(0))
        );
        assert!(matches!(
            "a.$[x".parse::<FieldPath>(),
            Err(PathParseError::UnclosedBracket(_))
        ));
    }

    #[test]
    fn test_schema_keys_drop_positions_after_arrays() {
        let path: FieldPath = "a.b.0.c".parse().unwrap();
        let keys = path.schema_keys(|prefix| prefix == "a.b");
        assert_eq!(keys.join("."), "a.b.c");
    }

    #[test]
    fn test_schema_keys_keep_digit_field_names() {
        let path: FieldPath = "2024".parse().unwrap();
        assert_eq!(path.schema_keys(|_| true), vec!["2024".to_string()]);

        let path: FieldPath = "stats.0.count".parse().unwrap();
        assert_eq!(path.schema_keys(|_| false).join("."), "stats.0.count");
    }

    #[test]
    fn test_display_round_trip() {
        let path: FieldPath = "items.12.tags".parse().unwrap();
        assert_eq!(path.to_string(), "items.12.tags");
    }
}
