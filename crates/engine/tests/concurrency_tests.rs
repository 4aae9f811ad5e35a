//! Concurrent use of the rewriter and the model registry
//!
//! Each thread owns its payloads; the path map and registry are shared.

use serde_json::json;
use std::sync::{Arc, Barrier};
use std::thread;
use vstamp_core::{Schema, SchemaPathMap, UpdateSpec, VersioningOptions};
use vstamp_engine::{apply_versioning, ModelRegistry, OperationKind, UpdateQuery, VersionOutcome};

fn toy_schema() -> Schema {
    Schema::from_definition(&json!({
        "name": "string",
        "colors": [{ "name": "string" }]
    }))
    .unwrap()
}

#[test]
fn shared_path_map_across_threads() {
    let paths = Arc::new(SchemaPathMap::from_schema(&toy_schema()));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let paths = Arc::clone(&paths);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut changed = 0usize;
                for i in 0..500 {
                    let mut update = if (t + i) % 2 == 0 {
                        UpdateSpec::from_value(json!({ "$push": { "colors": { "name": "x" } } }))
                    } else {
                        UpdateSpec::from_value(json!({ "name": "y", "__v": i }))
                    }
                    .unwrap();
                    if apply_versioning(&mut update, &VersioningOptions::default(), &paths) {
                        assert_eq!(update["$inc"], json!({ "__v": 1 }));
                        changed += 1;
                    } else {
                        assert_eq!(update.clone().into_value(), json!({ "name": "y" }));
                    }
                }
                changed
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 8 * 250);
}

#[test]
fn registry_serves_concurrent_hooks_while_registering() {
    let registry = Arc::new(ModelRegistry::new());
    registry.register("Toy", &toy_schema()).unwrap();

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..50 {
                registry.register(format!("Model{}", i), &toy_schema()).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..200 {
                    let update =
                        UpdateSpec::from_value(json!({ "$addToSet": { "colors": { "name": "z" } } }))
                            .unwrap();
                    let mut query = UpdateQuery::new(OperationKind::UpdateMany, update);
                    let outcome = registry.before_update("Toy", &mut query).unwrap();
                    assert_eq!(outcome, VersionOutcome::Incremented);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(registry.models().len(), 51);
}
