//! Schema documents loaded from TOML, YAML or JSON.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::registry::SchemaRegistry;
use super::types::{CommandSchema, ParameterSpec, SchemaError};
use crate::convert::value::ValueKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read schema file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported schema file extension: {path} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat { path: String },

    #[error("invalid TOML schema: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid YAML schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    #[serde(default)]
    commands: Vec<CommandConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandConfig {
    name: String,
    #[serde(default)]
    about: Option<String>,
    #[serde(default)]
    flags: Vec<ParameterConfig>,
    #[serde(default)]
    positionals: Vec<ParameterConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterConfig {
    name: String,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    min: Option<usize>,
    #[serde(default)]
    max: Option<usize>,
    #[serde(default)]
    variadic: bool,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default, rename = "type")]
    value_type: Option<String>,
    #[serde(default)]
    variants: Vec<String>,
}

impl ParameterConfig {
    fn into_spec(self, positional: bool) -> Result<ParameterSpec, SchemaError> {
        let kind = match self.value_type.as_deref() {
            Some(type_name) => Some(
                ValueKind::from_name(type_name, self.variants).map_err(|reason| {
                    SchemaError::InvalidType {
                        parameter: self.name.clone(),
                        reason,
                    }
                })?,
            ),
            None if !self.variants.is_empty() => {
                return Err(SchemaError::InvalidType {
                    parameter: self.name,
                    reason: "variants are only allowed with type = \"enum\"".to_string(),
                })
            }
            None => None,
        };

        // Flags default to an optional single value, positionals to exactly one.
        let default_min = if positional { 1 } else { 0 };
        let min_values = self.min.unwrap_or(default_min);
        let max_values = if self.variadic {
            None
        } else {
            Some(self.max.unwrap_or(min_values.max(1)))
        };

        Ok(ParameterSpec {
            name: self.name,
            alternate_name: if positional { None } else { self.alias },
            index: if positional { self.index } else { None },
            required: self.required,
            min_values,
            max_values,
            value_pattern: self.pattern,
            kind,
        })
    }
}

impl CommandConfig {
    fn into_schema(self) -> Result<CommandSchema, SchemaError> {
        let mut schema = CommandSchema::new(self.name);
        schema.about = self.about;
        for flag in self.flags {
            schema = schema.flag(flag.into_spec(false)?);
        }
        for positional in self.positionals {
            schema = schema.positional(positional.into_spec(true)?);
        }
        Ok(schema)
    }
}

fn build_registry(document: SchemaDocument) -> Result<SchemaRegistry, ConfigError> {
    let mut registry = SchemaRegistry::new();
    for command in document.commands {
        registry.register(command.into_schema()?)?;
    }
    Ok(registry)
}

impl SchemaRegistry {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        build_registry(toml::from_str(input)?)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        build_registry(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        build_registry(serde_json::from_str(input)?)
    }

    /// Load a schema document, picking the format from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let loader: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("yaml") | Some("yml") => Self::from_yaml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ConfigError::UnsupportedFormat { path: shown }),
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        tracing::debug!(path = %shown, "loading command schemas");
        loader(&content)
    }
}
