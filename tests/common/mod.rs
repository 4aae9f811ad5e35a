//! Shared test utilities
//!
//! `ToyStore` stands in for the document store: it keeps a single document,
//! runs the registry's pre-update hooks, then applies the rewritten payload
//! with just enough operator support for the tests.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use vstamp::{ModelRegistry, OperationKind, Schema, UpdateQuery, UpdateSpec, VersioningOptions};

pub const MODEL: &str = "Toy";

pub fn toy_schema() -> Schema {
    Schema::from_definition(&json!({
        "name": "string",
        "colors": [{ "name": "string" }]
    }))
    .unwrap()
}

pub struct ToyStore {
    pub registry: ModelRegistry,
    pub doc: Map<String, Value>,
}

impl ToyStore {
    /// Register the toy model and create its document at version 0
    pub fn create(registry: ModelRegistry, doc: Value) -> Self {
        registry.register(MODEL, &toy_schema()).unwrap();
        let mut doc = doc.as_object().cloned().unwrap();
        doc.insert("__v".to_string(), json!(0));
        Self { registry, doc }
    }

    pub fn version(&self) -> i64 {
        self.doc["__v"].as_i64().unwrap()
    }

    /// Intercept, rewrite and apply one operation; returns the document
    pub fn run(&mut self, kind: OperationKind, update: Value, options: VersioningOptions) -> &Map<String, Value> {
        let update = UpdateSpec::from_value(update).unwrap();
        let mut query = UpdateQuery::new(kind, update).with_options(options);
        self.registry.before_update(MODEL, &mut query).unwrap();

        if kind == OperationKind::ReplaceOne {
            self.doc = query.update.into_inner();
        } else {
            apply_update(&mut self.doc, query.update);
        }
        &self.doc
    }
}

fn apply_update(doc: &mut Map<String, Value>, update: UpdateSpec) {
    for (key, value) in update.into_inner() {
        match key.as_str() {
            "$set" => {
                for (path, v) in value.as_object().cloned().unwrap_or_default() {
                    doc.insert(path, v);
                }
            }
            "$inc" => {
                for (path, by) in value.as_object().cloned().unwrap_or_default() {
                    let current = doc.get(&path).and_then(Value::as_i64).unwrap_or(0);
                    doc.insert(path, json!(current + by.as_i64().unwrap()));
                }
            }
            "$push" => {
                for (path, item) in value.as_object().cloned().unwrap_or_default() {
                    let slot = doc.entry(path).or_insert_with(|| json!([]));
                    slot.as_array_mut().unwrap().push(item);
                }
            }
            "$pull" => {
                for (path, item) in value.as_object().cloned().unwrap_or_default() {
                    if let Some(items) = doc.get_mut(&path).and_then(Value::as_array_mut) {
                        items.retain(|existing| existing != &item);
                    }
                }
            }
            op if op.starts_with('$') => panic!("ToyStore does not support {}", op),
            _ => {
                doc.insert(key, value);
            }
        }
    }
}
