//! Parameter and Command Schemas
//!
//! Declarations the binder validates command nodes against. Schemas are
//! built once (by hand or from a config file), validated, and then shared
//! read-only behind `Arc`.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::convert::pattern::compile_pattern;
use crate::convert::value::ValueKind;
use crate::parser::lexer::is_valid_alias;

/// Inconsistencies in a declared schema. These are configuration bugs, not
/// user input errors, and are always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("invalid command name '{name}': each word must be lowercase letters with single internal dashes")]
    InvalidCommandName { name: String },

    #[error("no schema available for command '{name}'")]
    MissingSchema { name: String },

    #[error("command '{name}' is registered more than once")]
    DuplicateCommand { name: String },

    #[error("command '{command}': invalid parameter name '{name}'")]
    InvalidParameterName { command: String, name: String },

    #[error("command '{command}': parameter '{parameter}' declares min {min} greater than max {max}")]
    InvalidArity {
        command: String,
        parameter: String,
        min: usize,
        max: usize,
    },

    #[error("command '{command}': only the last positional may be variadic, but '{parameter}' is unbounded")]
    VariadicNotLast { command: String, parameter: String },

    #[error("command '{command}': parameter name '{name}' is declared more than once")]
    DuplicateParameter { command: String, name: String },

    #[error("command '{command}': positional index {index} is declared more than once")]
    DuplicateIndex { command: String, index: usize },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("parameter '{parameter}': {reason}")]
    InvalidType { parameter: String, reason: String },
}

/// Permitted `[min, max]` value count. `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..", self.min),
        }
    }
}

/// A declared flag or positional parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    /// Flags only: an alternate (usually one-letter) name
    pub alternate_name: Option<String>,
    /// Positionals only: ordering key
    pub index: Option<usize>,
    pub required: bool,
    pub min_values: usize,
    /// `None` is unbounded (variadic)
    pub max_values: Option<usize>,
    pub value_pattern: Option<String>,
    pub kind: Option<ValueKind>,
}

impl ParameterSpec {
    /// A flag accepting zero or one value.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alternate_name: None,
            index: None,
            required: false,
            min_values: 0,
            max_values: Some(1),
            value_pattern: None,
            kind: None,
        }
    }

    /// A positional taking exactly one value.
    pub fn positional(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            alternate_name: None,
            index: Some(index),
            required: false,
            min_values: 1,
            max_values: Some(1),
            value_pattern: None,
            kind: None,
        }
    }

    pub fn alias(mut self, alternate_name: impl Into<String>) -> Self {
        self.alternate_name = Some(alternate_name.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn arity(mut self, min: usize, max: usize) -> Self {
        self.min_values = min;
        self.max_values = Some(max);
        self
    }

    /// Unbounded maximum, keeping the current minimum.
    pub fn variadic(mut self) -> Self {
        self.max_values = None;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.value_pattern = Some(pattern.into());
        self
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn declared_arity(&self) -> Arity {
        Arity {
            min: self.min_values,
            max: self.max_values,
        }
    }

    /// A required parameter needs at least one value.
    pub fn effective_min(&self) -> usize {
        if self.required {
            self.min_values.max(1)
        } else {
            self.min_values
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.max_values.is_none()
    }

    /// Match a stripped flag name against this spec's name or alternate name.
    pub fn answers_to(&self, given: &str) -> bool {
        self.name == given || self.alternate_name.as_deref() == Some(given)
    }
}

/// Everything the binder needs to know about one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSchema {
    pub name: String,
    pub about: Option<String>,
    pub flags: Vec<ParameterSpec>,
    /// Ordered by `index` once validated
    pub positionals: Vec<ParameterSpec>,
}

impl CommandSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            flags: Vec::new(),
            positionals: Vec::new(),
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn flag(mut self, spec: ParameterSpec) -> Self {
        self.flags.push(spec);
        self
    }

    /// Append a positional; a spec without an index takes the next slot.
    pub fn positional(mut self, mut spec: ParameterSpec) -> Self {
        if spec.index.is_none() {
            spec.index = Some(self.positionals.len());
        }
        self.positionals.push(spec);
        self
    }

    pub fn find_flag(&self, given: &str) -> Option<&ParameterSpec> {
        self.flags.iter().find(|spec| spec.answers_to(given))
    }

    /// Check every invariant and return the schema with positionals sorted
    /// by index.
    pub fn validated(mut self) -> Result<Self, SchemaError> {
        if !is_valid_command_name(&self.name) {
            return Err(SchemaError::InvalidCommandName { name: self.name });
        }

        let mut flag_names = HashSet::new();
        for spec in &self.flags {
            // A required flag only has to be present, so its declared minimum stands.
            self.check_parameter(spec, spec.min_values)?;
            let names = std::iter::once(&spec.name).chain(spec.alternate_name.iter());
            for name in names {
                if !is_valid_alias(name) {
                    return Err(SchemaError::InvalidParameterName {
                        command: self.name.clone(),
                        name: name.clone(),
                    });
                }
                if !flag_names.insert(name.clone()) {
                    return Err(SchemaError::DuplicateParameter {
                        command: self.name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }

        self.positionals.sort_by_key(|spec| spec.index);
        let mut positional_names = HashSet::new();
        let mut indexes = HashSet::new();
        for spec in &self.positionals {
            self.check_parameter(spec, spec.effective_min())?;
            if spec.name.is_empty() {
                return Err(SchemaError::InvalidParameterName {
                    command: self.name.clone(),
                    name: spec.name.clone(),
                });
            }
            if !positional_names.insert(spec.name.clone()) {
                return Err(SchemaError::DuplicateParameter {
                    command: self.name.clone(),
                    name: spec.name.clone(),
                });
            }
            if let Some(index) = spec.index {
                if !indexes.insert(index) {
                    return Err(SchemaError::DuplicateIndex {
                        command: self.name.clone(),
                        index,
                    });
                }
            }
        }
        check_variadic_tail(&self.name, &self.positionals)?;

        Ok(self)
    }

    fn check_parameter(&self, spec: &ParameterSpec, min: usize) -> Result<(), SchemaError> {
        if let Some(max) = spec.max_values {
            if min > max {
                return Err(SchemaError::InvalidArity {
                    command: self.name.clone(),
                    parameter: spec.name.clone(),
                    min,
                    max,
                });
            }
        }
        if let Some(pattern) = &spec.value_pattern {
            compile_pattern(pattern)?;
        }
        Ok(())
    }
}

/// Only the last positional may have an unbounded maximum.
pub fn check_variadic_tail(command: &str, positionals: &[ParameterSpec]) -> Result<(), SchemaError> {
    let last = positionals.len().saturating_sub(1);
    match positionals
        .iter()
        .enumerate()
        .find(|(i, spec)| *i != last && spec.is_variadic())
    {
        Some((_, spec)) => Err(SchemaError::VariadicNotLast {
            command: command.to_string(),
            parameter: spec.name.clone(),
        }),
        None => Ok(()),
    }
}

/// A command name is one or more valid aliases joined by single spaces.
pub fn is_valid_command_name(name: &str) -> bool {
    !name.is_empty() && name.split(' ').all(is_valid_alias)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_display() {
        let spec = ParameterSpec::flag("items").arity(1, 2);
        assert_eq!(spec.declared_arity().to_string(), "1..2");
        assert_eq!(spec.variadic().declared_arity().to_string(), "1..");
    }

    #[test]
    fn test_effective_min() {
        assert_eq!(ParameterSpec::positional("a", 0).arity(0, 1).effective_min(), 0);
        assert_eq!(ParameterSpec::positional("a", 0).arity(0, 1).required().effective_min(), 1);
        assert_eq!(ParameterSpec::positional("a", 0).arity(3, 4).required().effective_min(), 3);
    }

    #[test]
    fn test_positionals_sorted_by_index() {
        let schema = CommandSchema::new("copy")
            .positional(ParameterSpec::positional("dest", 1))
            .positional(ParameterSpec::positional("src", 0))
            .validated()
            .unwrap();
        let names: Vec<&str> = schema.positionals.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["src", "dest"]);
    }

    #[test]
    fn test_rejects_non_tail_variadic() {
        let err = CommandSchema::new("copy")
            .positional(ParameterSpec::positional("src", 0).arity(1, 1).variadic())
            .positional(ParameterSpec::positional("dest", 1))
            .validated()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::VariadicNotLast {
                command: "copy".to_string(),
                parameter: "src".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(matches!(
            CommandSchema::new("db--migrate").validated(),
            Err(SchemaError::InvalidCommandName { .. })
        ));
        assert!(matches!(
            CommandSchema::new("db  migrate").validated(),
            Err(SchemaError::InvalidCommandName { .. })
        ));
        assert!(matches!(
            CommandSchema::new("db").flag(ParameterSpec::flag("Fast")).validated(),
            Err(SchemaError::InvalidParameterName { .. })
        ));
    }

    #[test]
    fn test_rejects_alias_clash() {
        let err = CommandSchema::new("db")
            .flag(ParameterSpec::flag("verbose").alias("v"))
            .flag(ParameterSpec::flag("version").alias("v"))
            .validated()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateParameter { name, .. } if name == "v"));
    }

    #[test]
    fn test_rejects_min_over_max_and_bad_pattern() {
        assert!(matches!(
            CommandSchema::new("db").flag(ParameterSpec::flag("n").arity(3, 1)).validated(),
            Err(SchemaError::InvalidArity { min: 3, max: 1, .. })
        ));
        assert!(matches!(
            CommandSchema::new("db").flag(ParameterSpec::flag("n").pattern("(")).validated(),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_rejects_required_with_zero_max() {
        assert!(matches!(
            CommandSchema::new("x")
                .positional(ParameterSpec::positional("a", 0).arity(0, 0).required())
                .validated(),
            Err(SchemaError::InvalidArity { min: 1, max: 0, .. })
        ));
        assert!(CommandSchema::new("x")
            .positional(ParameterSpec::positional("a", 0).arity(0, 1).required())
            .validated()
            .is_ok());
        assert!(CommandSchema::new("x")
            .flag(ParameterSpec::flag("force").arity(0, 0).required())
            .validated()
            .is_ok());
    }

    #[test]
    fn test_find_flag_by_alias() {
        let schema = CommandSchema::new("db").flag(ParameterSpec::flag("dry-run").alias("d"));
        assert_eq!(schema.find_flag("d").map(|s| s.name.as_str()), Some("dry-run"));
        assert_eq!(schema.find_flag("dry-run").map(|s| s.name.as_str()), Some("dry-run"));
        assert!(schema.find_flag("x").is_none());
    }
}
