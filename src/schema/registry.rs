//! Schema Provider and Registry
//!
//! The binder only sees schemas through [`SchemaProvider`]. How a provider
//! discovers its commands (manual registration, a config file, a command
//! table) is its own business.

use std::sync::Arc;

use indexmap::IndexMap;

use super::types::{CommandSchema, SchemaError};

/// Lookup interface consumed by the lexer and binder.
pub trait SchemaProvider: Send + Sync {
    /// Every known (possibly space-joined) command name.
    fn command_names(&self) -> Vec<String>;

    /// Declared flags and positionals for one command.
    fn schema_for(&self, name: &str) -> Option<Arc<CommandSchema>>;
}

impl<P: SchemaProvider + ?Sized> SchemaProvider for Arc<P> {
    fn command_names(&self) -> Vec<String> {
        (**self).command_names()
    }

    fn schema_for(&self, name: &str) -> Option<Arc<CommandSchema>> {
        (**self).schema_for(name)
    }
}

/// Schemas registered up front and validated on the way in.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Arc<CommandSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: IndexMap::new(),
        }
    }

    pub fn register(&mut self, schema: CommandSchema) -> Result<(), SchemaError> {
        let schema = schema.validated()?;
        if self.schemas.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateCommand { name: schema.name });
        }
        tracing::trace!(command = %schema.name, "registered command schema");
        self.schemas.insert(schema.name.clone(), Arc::new(schema));
        Ok(())
    }

    /// Builder-style registration.
    pub fn with(mut self, schema: CommandSchema) -> Result<Self, SchemaError> {
        self.register(schema)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&CommandSchema> {
        self.schemas.get(name).map(|s| s.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn schemas(&self) -> impl Iterator<Item = &CommandSchema> {
        self.schemas.values().map(|s| s.as_ref())
    }
}

impl SchemaProvider for SchemaRegistry {
    fn command_names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }

    fn schema_for(&self, name: &str) -> Option<Arc<CommandSchema>> {
        self.schemas.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::ParameterSpec;

    #[test]
    fn test_register_and_lookup() {
        let registry = SchemaRegistry::new()
            .with(CommandSchema::new("db"))
            .unwrap()
            .with(CommandSchema::new("db migrate").flag(ParameterSpec::flag("fast")))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.command_names(), vec!["db", "db migrate"]);
        assert!(registry.schema_for("db migrate").is_some());
        assert!(registry.schema_for("migrate").is_none());
    }

    #[test]
    fn test_duplicate_command_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register(CommandSchema::new("db")).unwrap();
        assert_eq!(
            registry.register(CommandSchema::new("db")),
            Err(SchemaError::DuplicateCommand {
                name: "db".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_schema_not_registered() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.register(CommandSchema::new("Db")).is_err());
        assert!(registry.is_empty());
    }
}
