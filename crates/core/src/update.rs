//! Update specifications and update operators
//!
//! An [`UpdateSpec`] is the payload of a partial-update request: a JSON object
//! whose keys are either update operators (`$set`, `$inc`, `$push`, ...) each
//! holding a sub-object of `path → value`, or bare field names holding
//! replacement values. Bare fields are shorthand for `$set`.
//!
//! The payload keeps the shape the caller gave it, key order included. [`UpdateSpec::assignments`]
//! is the normalized view: it yields bare fields and `$set` entries through one
//! iterator, so anything that cares about "which paths get a new literal
//! value" has a single code path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// Prefix reserved for update operator names
pub const OPERATOR_PREFIX: char = '$';

/// Whether a top-level key names an update operator rather than a field
pub fn is_operator_key(key: &str) -> bool {
    key.starts_with(OPERATOR_PREFIX)
}

// =============================================================================
// UpdateOperator
// =============================================================================

/// Update operators the rewriter knows by name
///
/// Operators outside this set are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOperator {
    /// `$set`: assign a literal value
    Set,
    /// `$unset`: remove a field
    Unset,
    /// `$setOnInsert`: assign only when upserting
    SetOnInsert,
    /// `$inc`: add to a number
    Inc,
    /// `$mul`: multiply a number
    Mul,
    /// `$min`: keep the smaller value
    Min,
    /// `$max`: keep the larger value
    Max,
    /// `$rename`: rename a field
    Rename,
    /// `$currentDate`: assign the current date
    CurrentDate,
    /// `$push`: append to an array
    Push,
    /// `$pull`: remove matching array elements
    Pull,
    /// `$addToSet`: append unless already present
    AddToSet,
    /// `$pop`: remove the first or last array element
    Pop,
    /// `$pullAll`: remove all listed array elements
    PullAll,
}

impl UpdateOperator {
    /// Operators that are only legal against array-typed fields
    pub const ARRAY_MUTATIONS: [UpdateOperator; 5] = [
        UpdateOperator::Push,
        UpdateOperator::Pull,
        UpdateOperator::AddToSet,
        UpdateOperator::Pop,
        UpdateOperator::PullAll,
    ];

    /// Operator name as it appears in an update payload
    pub fn name(&self) -> &'static str {
        match self {
            UpdateOperator::Set => "$set",
            UpdateOperator::Unset => "$unset",
            UpdateOperator::SetOnInsert => "$setOnInsert",
            UpdateOperator::Inc => "$inc",
            UpdateOperator::Mul => "$mul",
            UpdateOperator::Min => "$min",
            UpdateOperator::Max => "$max",
            UpdateOperator::Rename => "$rename",
            UpdateOperator::CurrentDate => "$currentDate",
            UpdateOperator::Push => "$push",
            UpdateOperator::Pull => "$pull",
            UpdateOperator::AddToSet => "$addToSet",
            UpdateOperator::Pop => "$pop",
            UpdateOperator::PullAll => "$pullAll",
        }
    }

    /// Look up an operator by its payload name
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "$set" => UpdateOperator::Set,
            "$unset" => UpdateOperator::Unset,
            "$setOnInsert" => UpdateOperator::SetOnInsert,
            "$inc" => UpdateOperator::Inc,
            "$mul" => UpdateOperator::Mul,
            "$min" => UpdateOperator::Min,
            "$max" => UpdateOperator::Max,
            "$rename" => UpdateOperator::Rename,
            "$currentDate" => UpdateOperator::CurrentDate,
            "$push" => UpdateOperator::Push,
            "$pull" => UpdateOperator::Pull,
            "$addToSet" => UpdateOperator::AddToSet,
            "$pop" => UpdateOperator::Pop,
            "$pullAll" => UpdateOperator::PullAll,
            _ => return None,
        };
        Some(op)
    }

    /// Whether this operator only makes sense against an array
    pub fn is_array_mutation(&self) -> bool {
        Self::ARRAY_MUTATIONS.contains(self)
    }
}

impl FromStr for UpdateOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UpdateOperator::from_name(s).ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for UpdateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// UpdateSpec
// =============================================================================

/// A partial-update payload
///
/// Newtype around a JSON object with direct access to the map through
/// `Deref`/`DerefMut`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vstamp_core::update::UpdateSpec;
///
/// let update = UpdateSpec::from_value(json!({
///     "name": "Santa",
///     "$set": { "tags": ["elf"] }
/// }))
/// .unwrap();
///
/// let assigned: Vec<&str> = update.assignments().map(|(path, _)| path).collect();
/// assert_eq!(assigned.len(), 2);
/// assert!(assigned.contains(&"name"));
/// assert!(assigned.contains(&"tags"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateSpec(Map<String, Value>);

impl UpdateSpec {
    /// Create an empty update
    pub fn new() -> Self {
        UpdateSpec(Map::new())
    }

    /// Wrap a JSON value; `None` unless it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(UpdateSpec(map)),
            _ => None,
        }
    }

    /// Get the underlying map
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Convert back into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Sub-object of an operator, if present and an object
    pub fn operator(&self, op: UpdateOperator) -> Option<&Map<String, Value>> {
        self.0.get(op.name()).and_then(Value::as_object)
    }

    /// Mutable sub-object of an operator, if present and an object
    pub fn operator_mut(&mut self, op: UpdateOperator) -> Option<&mut Map<String, Value>> {
        self.0.get_mut(op.name()).and_then(Value::as_object_mut)
    }

    /// Sub-object of an operator, created when absent
    ///
    /// A present but non-object operand is replaced by an empty object; the
    /// second element reports whether that happened.
    pub fn operator_entry(&mut self, op: UpdateOperator) -> (&mut Map<String, Value>, bool) {
        let slot = self
            .0
            .entry(op.name())
            .or_insert_with(|| Value::Object(Map::new()));
        let replaced = !slot.is_object();
        if replaced {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => (map, replaced),
            _ => unreachable!("operator slot was just made an object"),
        }
    }

    /// Recognized operators present with object operands, in payload order
    pub fn operators(&self) -> impl Iterator<Item = (UpdateOperator, &Map<String, Value>)> {
        self.0.iter().filter_map(|(key, value)| {
            let op = UpdateOperator::from_name(key)?;
            value.as_object().map(|fields| (op, fields))
        })
    }

    /// Bare top-level field assignments (implicit `$set`)
    pub fn bare_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(key, _)| !is_operator_key(key))
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Every literal assignment: bare fields followed by `$set` entries
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &Value)> {
        let explicit = self
            .operator(UpdateOperator::Set)
            .into_iter()
            .flat_map(|fields| fields.iter().map(|(key, value)| (key.as_str(), value)));
        self.bare_fields().chain(explicit)
    }

    /// Remove a literal assignment to `path`, bare or under `$set`
    ///
    /// Drops `$set` when the removal leaves it empty. Returns whether
    /// anything was removed.
    pub fn remove_assignment(&mut self, path: &str) -> bool {
        let mut removed = false;
        if !is_operator_key(path) {
            removed |= self.0.shift_remove(path).is_some();
        }

        let mut emptied = false;
        if let Some(fields) = self.operator_mut(UpdateOperator::Set) {
            if fields.shift_remove(path).is_some() {
                removed = true;
                emptied = fields.is_empty();
            }
        }
        if emptied {
            self.0.shift_remove(UpdateOperator::Set.name());
        }
        removed
    }
}

impl Deref for UpdateSpec {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for UpdateSpec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for UpdateSpec {
    fn from(map: Map<String, Value>) -> Self {
        UpdateSpec(map)
    }
}

impl From<UpdateSpec> for Value {
    fn from(update: UpdateSpec) -> Self {
        update.into_value()
    }
}

impl fmt::Display for UpdateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: Value) -> UpdateSpec {
        UpdateSpec::from_value(value).unwrap()
    }

    #[test]
    fn test_operator_names_round_trip() {
        for name in [
            "$set", "$unset", "$setOnInsert", "$inc", "$mul", "$min", "$max", "$rename",
            "$currentDate", "$push", "$pull", "$addToSet", "$pop", "$pullAll",
        ] {
            let op: UpdateOperator = name.parse().unwrap();
            assert_eq!(op.name(), name);
        }
        assert!("$bogus".parse::<UpdateOperator>().is_err());
    }

    #[test]
    fn test_array_mutation_operators() {
        let array_ops: Vec<_> = ["$push", "$pull", "$addToSet", "$pop", "$pullAll"]
            .iter()
            .map(|n| UpdateOperator::from_name(n).unwrap())
            .collect();
        for op in &array_ops {
            assert!(op.is_array_mutation());
        }
        assert!(!UpdateOperator::Set.is_array_mutation());
        assert!(!UpdateOperator::Inc.is_array_mutation());
        assert!(!UpdateOperator::Unset.is_array_mutation());
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(UpdateSpec::from_value(json!([1, 2])).is_none());
        assert!(UpdateSpec::from_value(json!(null)).is_none());
        assert!(UpdateSpec::from_value(json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_operators_skip_unknown_and_non_object() {
        let u = update(json!({
            "$push": { "tags": "a" },
            "$bogus": { "x": 1 },
            "$inc": 5,
            "name": "x"
        }));
        let ops: Vec<UpdateOperator> = u.operators().map(|(op, _)| op).collect();
        assert_eq!(ops, vec![UpdateOperator::Push]);
    }

    #[test]
    fn test_assignments_include_bare_and_set() {
        let u = update(json!({
            "name": "Santa",
            "$set": { "tags": ["elf"], "owner.name": "Claus" },
            "$inc": { "count": 1 }
        }));
        let mut paths: Vec<&str> = u.assignments().map(|(p, _)| p).collect();
        paths.sort();
        assert_eq!(paths, vec!["name", "owner.name", "tags"]);
    }

    #[test]
    fn test_remove_bare_assignment() {
        let mut u = update(json!({ "name": "foo", "__v": 42 }));
        assert!(u.remove_assignment("__v"));
        assert_eq!(u.into_value(), json!({ "name": "foo" }));
    }

    #[test]
    fn test_remove_set_assignment_keeps_other_fields() {
        let mut u = update(json!({ "$set": { "tags": ["foo"], "__v": 42 } }));
        assert!(u.remove_assignment("__v"));
        assert_eq!(u.into_value(), json!({ "$set": { "tags": ["foo"] } }));
    }

    #[test]
    fn test_remove_set_assignment_drops_emptied_set() {
        let mut u = update(json!({ "$set": { "__v": 42 }, "name": "x" }));
        assert!(u.remove_assignment("__v"));
        assert_eq!(u.into_value(), json!({ "name": "x" }));
    }

    #[test]
    fn test_remove_assignment_leaves_preexisting_empty_set() {
        let mut u = update(json!({ "$set": {} }));
        assert!(!u.remove_assignment("__v"));
        assert_eq!(u.into_value(), json!({ "$set": {} }));
    }

    #[test]
    fn test_remove_assignment_never_removes_operators() {
        let mut u = update(json!({ "$set": { "a": 1 } }));
        assert!(!u.remove_assignment("$set"));
        assert_eq!(u.len(), 1);
    }

    #[test]
    fn test_operator_entry_creates_and_replaces() {
        let mut u = UpdateSpec::new();
        let (inc, replaced) = u.operator_entry(UpdateOperator::Inc);
        assert!(!replaced);
        inc.insert("__v".into(), json!(1));
        assert_eq!(u.clone().into_value(), json!({ "$inc": { "__v": 1 } }));

        let mut u = update(json!({ "$inc": "garbage" }));
        let (_, replaced) = u.operator_entry(UpdateOperator::Inc);
        assert!(replaced);
        assert_eq!(u.into_value(), json!({ "$inc": {} }));
    }

    #[test]
    fn test_display_is_json() {
        let u = update(json!({ "name": "x" }));
        assert_eq!(u.to_string(), r#"{"name":"x"}"#);
    }
}
