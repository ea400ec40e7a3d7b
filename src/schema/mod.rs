//! Command schemas: what each command accepts.

pub mod cache;
pub mod config;
pub mod registry;
pub mod types;

pub use cache::CachedSchemaProvider;
pub use config::ConfigError;
pub use registry::{SchemaProvider, SchemaRegistry};
pub use types::{Arity, CommandSchema, ParameterSpec, SchemaError};
