// src/commands/registry.rs
use std::collections::HashMap;
use std::sync::Arc;

use super::types::Command;
use crate::schema::{CommandSchema, SchemaError, SchemaProvider, SchemaRegistry};

/// Executable commands together with their validated schemas.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    schemas: SchemaRegistry,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            schemas: SchemaRegistry::new(),
        }
    }

    /// Register a command under `cmd.name()`; its schema is validated first.
    pub fn register(&mut self, cmd: Box<dyn Command>) -> Result<(), SchemaError> {
        let mut schema = cmd.schema();
        schema.name = cmd.name().to_string();
        let name = schema.name.clone();
        self.schemas.register(schema)?;
        self.commands.insert(name, cmd);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(|s| s.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaProvider for CommandRegistry {
    fn command_names(&self) -> Vec<String> {
        self.schemas.command_names()
    }

    fn schema_for(&self, name: &str) -> Option<Arc<CommandSchema>> {
        self.schemas.schema_for(name)
    }
}
