//! Model registry
//!
//! Associates each model name with its schema path map and the hooks that
//! run before its update-style operations. The path map is built once, when
//! the schema is registered, and shared as `Arc<SchemaPathMap>` afterwards.
//!
//! ## Thread Safety
//!
//! The model table sits behind a `parking_lot::RwLock`. Hooks are cloned out
//! of the table before they run, so no lock is held while a hook rewrites a
//! payload.

use crate::config::VersioningConfig;
use crate::hooks::{OperationKind, PreUpdateHook, UpdateQuery, UpdateVersioningPlugin};
use crate::rewriter::VersionOutcome;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use vstamp_core::error::{Error, Result};
use vstamp_core::schema::{Schema, SchemaPathMap};

struct ModelEntry {
    schema_paths: Arc<SchemaPathMap>,
    hooks: HashMap<OperationKind, Vec<Arc<dyn PreUpdateHook>>>,
}

/// Registered models, their path maps and their pre-update hooks
pub struct ModelRegistry {
    config: VersioningConfig,
    models: RwLock<HashMap<String, ModelEntry>>,
}

impl ModelRegistry {
    /// Registry with the default configuration
    pub fn new() -> Self {
        Self {
            config: VersioningConfig::default(),
            models: RwLock::new(HashMap::new()),
        }
    }

    /// Registry that attaches the versioning plugin as `config` describes
    ///
    /// # Errors
    ///
    /// Returns the [`VersioningConfig::validate`] error for an invalid
    /// version key or operation name.
    pub fn with_config(config: VersioningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            models: RwLock::new(HashMap::new()),
        })
    }

    /// Configuration in effect
    pub fn config(&self) -> &VersioningConfig {
        &self.config
    }

    /// Register (or re-register) a model's schema
    ///
    /// Builds the schema path map and, unless versioning is disabled in the
    /// configuration, attaches an [`UpdateVersioningPlugin`] to every
    /// configured operation kind. Re-registering replaces earlier hooks.
    pub fn register(&self, model: impl Into<String>, schema: &Schema) -> Result<Arc<SchemaPathMap>> {
        let model = model.into();
        let kinds = self.config.operation_kinds()?;
        let schema_paths = Arc::new(SchemaPathMap::from_schema(schema));

        let mut hooks: HashMap<OperationKind, Vec<Arc<dyn PreUpdateHook>>> = HashMap::new();
        if self.config.enabled {
            let plugin: Arc<dyn PreUpdateHook> = Arc::new(UpdateVersioningPlugin::with_version_key(
                self.config.version_key.clone(),
            ));
            for kind in &kinds {
                hooks.entry(*kind).or_default().push(Arc::clone(&plugin));
            }
        }

        info!(
            model = %model,
            paths = schema_paths.len(),
            hooked = hooks.len(),
            "registered model schema"
        );
        self.models.write().insert(
            model,
            ModelEntry {
                schema_paths: Arc::clone(&schema_paths),
                hooks,
            },
        );
        Ok(schema_paths)
    }

    /// Attach an additional hook to one operation kind of a model
    pub fn add_hook(
        &self,
        model: &str,
        kind: OperationKind,
        hook: Arc<dyn PreUpdateHook>,
    ) -> Result<()> {
        let mut models = self.models.write();
        let entry = models
            .get_mut(model)
            .ok_or_else(|| Error::UnknownModel(model.to_string()))?;
        entry.hooks.entry(kind).or_default().push(hook);
        Ok(())
    }

    /// Path map of a registered model
    pub fn schema_paths(&self, model: &str) -> Result<Arc<SchemaPathMap>> {
        self.models
            .read()
            .get(model)
            .map(|entry| Arc::clone(&entry.schema_paths))
            .ok_or_else(|| Error::UnknownModel(model.to_string()))
    }

    /// Whether a model is registered
    pub fn contains(&self, model: &str) -> bool {
        self.models.read().contains_key(model)
    }

    /// Names of all registered models, sorted
    pub fn models(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Run the model's hooks for `query.kind`, in registration order
    ///
    /// A version change reported by any hook is kept over later unchanged
    /// outcomes; [`VersionOutcome::Unchanged`] when no hook is attached.
    pub fn before_update(&self, model: &str, query: &mut UpdateQuery) -> Result<VersionOutcome> {
        let (schema_paths, hooks) = {
            let models = self.models.read();
            let entry = models
                .get(model)
                .ok_or_else(|| Error::UnknownModel(model.to_string()))?;
            let hooks = entry.hooks.get(&query.kind).cloned().unwrap_or_default();
            (Arc::clone(&entry.schema_paths), hooks)
        };

        let mut outcome = VersionOutcome::Unchanged;
        for hook in &hooks {
            let next = hook.before_update(query, &schema_paths);
            if next.changed() || !outcome.changed() {
                outcome = next;
            }
        }
        debug!(model, operation = %query.kind, hooks = hooks.len(), ?outcome, "pre-update hooks done");
        Ok(outcome)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
