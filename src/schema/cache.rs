//! Write-once schema lookup cache.
//!
//! Wraps a provider whose lookups are expensive (discovery, file parsing)
//! so each command name is resolved at most once per process. Entries are
//! immutable after insertion; a racing second writer keeps the first value.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::registry::SchemaProvider;
use super::types::CommandSchema;

pub struct CachedSchemaProvider<P> {
    inner: P,
    names: RwLock<Option<Arc<Vec<String>>>>,
    schemas: RwLock<HashMap<String, Arc<CommandSchema>>>,
}

impl<P: SchemaProvider> CachedSchemaProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            names: RwLock::new(None),
            schemas: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of schemas resolved so far.
    pub fn cached_len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl<P: SchemaProvider> SchemaProvider for CachedSchemaProvider<P> {
    fn command_names(&self) -> Vec<String> {
        if let Some(names) = self
            .names
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            return names.as_ref().clone();
        }

        let resolved = Arc::new(self.inner.command_names());
        let mut slot = self
            .names
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.get_or_insert(resolved).as_ref().clone()
    }

    fn schema_for(&self, name: &str) -> Option<Arc<CommandSchema>> {
        if let Some(schema) = self
            .schemas
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
        {
            return Some(Arc::clone(schema));
        }

        let resolved = self.inner.schema_for(name)?;
        let mut schemas = self
            .schemas
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = schemas.entry(name.to_string()).or_insert_with(|| {
            tracing::trace!(command = name, "cached command schema");
            resolved
        });
        Some(Arc::clone(entry))
    }
}
