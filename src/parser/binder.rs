//! Argument Binder
//!
//! Validates lexed command nodes against their schemas and produces one
//! execution context per command. Each command stops at its first
//! violation, and a run stops at the first command that fails.
//!
//! Per command, in order:
//!   flags       → known name, arity, pattern, conversion
//!   required    → every required flag present
//!   positionals → partition across specs, pattern, conversion

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::types::{display_flag_name, CommandNode};
use crate::convert::pattern::first_mismatch;
use crate::convert::value::{convert_all, Value};
use crate::parser::lexer::Lexer;
use crate::parser::partition::partition_positionals;
use crate::parser::types::ParseError;
use crate::schema::registry::SchemaProvider;
use crate::schema::types::{CommandSchema, ParameterSpec, SchemaError};

/// Values bound to one flag or positional spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundParameter {
    pub name: String,
    pub raw: Vec<String>,
    pub values: Vec<Value>,
}

impl BoundParameter {
    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }
}

/// A validated, ready-to-execute command invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionContext {
    command_name: String,
    /// Keyed by the spec's canonical name, whichever alias was written
    flags: IndexMap<String, BoundParameter>,
    /// One entry per positional spec, in spec order
    positionals: Vec<BoundParameter>,
    raw_positional_tokens: Vec<String>,
}

impl ExecutionContext {
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn flags(&self) -> impl Iterator<Item = &BoundParameter> {
        self.flags.values()
    }

    pub fn flag(&self, name: &str) -> Option<&BoundParameter> {
        self.flags.get(name)
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn flag_values(&self, name: &str) -> &[Value] {
        self.flags
            .get(name)
            .map(|bound| bound.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn positionals(&self) -> &[BoundParameter] {
        &self.positionals
    }

    pub fn positional(&self, name: &str) -> Option<&BoundParameter> {
        self.positionals.iter().find(|bound| bound.name == name)
    }

    pub fn positional_values(&self, name: &str) -> &[Value] {
        self.positional(name)
            .map(|bound| bound.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn raw_positional_tokens(&self) -> &[String] {
        &self.raw_positional_tokens
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_name)?;
        for flag in self.flags.values() {
            write!(f, " {}", display_flag_name(&flag.name))?;
            for value in &flag.raw {
                write!(f, " {}", value)?;
            }
        }
        for positional in &self.positionals {
            match positional.raw.as_slice() {
                [single] => write!(f, " {}={}", positional.name, single)?,
                many => write!(f, " {}=[{}]", positional.name, many.join(", "))?,
            }
        }
        Ok(())
    }
}

/// Parser over one schema provider. Holds no per-run state, so a single
/// instance can parse any number of independent argument vectors.
pub struct Parser<'p, P: SchemaProvider + ?Sized> {
    provider: &'p P,
}

impl<'p, P: SchemaProvider + ?Sized> Parser<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    /// Lex without binding.
    pub fn lex(&self, tokens: &[String]) -> Result<Vec<CommandNode>, ParseError> {
        Ok(Lexer::new(tokens, self.provider.command_names()).tokenize()?)
    }

    /// Lex and bind a full argument vector.
    pub fn parse(&self, tokens: &[String]) -> Result<Vec<ExecutionContext>, ParseError> {
        let nodes = self.lex(tokens)?;
        nodes.iter().map(|node| self.bind(node)).collect()
    }

    /// Bind a single command node.
    pub fn bind(&self, node: &CommandNode) -> Result<ExecutionContext, ParseError> {
        let schema = self.schema(&node.name)?;
        let flags = bind_flags(&schema, node)?;

        let raw_positional_tokens = node.raw_positionals();
        let positionals = partition_positionals(&schema.name, &schema.positionals, &raw_positional_tokens)?
            .into_iter()
            .map(|part| {
                let label = format!("argument '{}'", part.spec.name);
                let values = convert_values(&schema.name, &label, part.spec, &part.values)?;
                Ok(BoundParameter {
                    name: part.spec.name.clone(),
                    raw: part.values,
                    values,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        tracing::debug!(
            command = %schema.name,
            flags = flags.len(),
            positionals = raw_positional_tokens.len(),
            "bound command"
        );

        Ok(ExecutionContext {
            command_name: schema.name.clone(),
            flags,
            positionals,
            raw_positional_tokens,
        })
    }

    fn schema(&self, name: &str) -> Result<Arc<CommandSchema>, ParseError> {
        self.provider.schema_for(name).ok_or_else(|| {
            SchemaError::MissingSchema {
                name: name.to_string(),
            }
            .into()
        })
    }
}

fn bind_flags(
    schema: &CommandSchema,
    node: &CommandNode,
) -> Result<IndexMap<String, BoundParameter>, ParseError> {
    let mut bound: IndexMap<String, BoundParameter> = IndexMap::new();

    for flag in &node.flag_nodes {
        if schema.flags.is_empty() {
            return Err(ParseError::CommandAcceptsNoFlags {
                command: schema.name.clone(),
                flag: flag.given_name.clone(),
            });
        }
        let spec = schema
            .find_flag(&flag.given_name)
            .ok_or_else(|| ParseError::UnknownFlag {
                command: schema.name.clone(),
                flag: flag.given_name.clone(),
            })?;

        let raw = flag.raw_values();
        let expected = spec.declared_arity();
        if !expected.contains(raw.len()) {
            return Err(ParseError::FlagArityViolation {
                command: schema.name.clone(),
                flag: flag.given_name.clone(),
                expected,
                actual: raw.len(),
            });
        }

        if let Some(pattern) = &spec.value_pattern {
            if let Some(value) = first_mismatch(pattern, raw.iter().map(|v| v.as_str()))? {
                return Err(ParseError::FlagPatternViolation {
                    command: schema.name.clone(),
                    flag: flag.given_name.clone(),
                    value: value.to_string(),
                    pattern: pattern.clone(),
                });
            }
        }

        let label = format!("flag {}", flag.display_name());
        let values = convert_values(&schema.name, &label, spec, &raw)?;

        // Repeated occurrences accumulate; each was arity-checked on its own.
        let entry = bound
            .entry(spec.name.clone())
            .or_insert_with(|| BoundParameter {
                name: spec.name.clone(),
                raw: Vec::new(),
                values: Vec::new(),
            });
        entry.raw.extend(raw);
        entry.values.extend(values);
    }

    if let Some(missing) = schema
        .flags
        .iter()
        .find(|spec| spec.required && !bound.contains_key(&spec.name))
    {
        return Err(ParseError::MissingRequiredFlag {
            command: schema.name.clone(),
            flag: missing.name.clone(),
        });
    }

    Ok(bound)
}

fn convert_values(
    command: &str,
    label: &str,
    spec: &ParameterSpec,
    raw: &[String],
) -> Result<Vec<Value>, ParseError> {
    match &spec.kind {
        Some(kind) => convert_all(raw, kind).map_err(|source| ParseError::Conversion {
            command: command.to_string(),
            parameter: label.to_string(),
            source,
        }),
        None => Ok(raw.iter().cloned().map(Value::Text).collect()),
    }
}

/// Parse `tokens` against `provider`.
pub fn parse<P: SchemaProvider + ?Sized>(
    tokens: &[String],
    provider: &P,
) -> Result<Vec<ExecutionContext>, ParseError> {
    Parser::new(provider).parse(tokens)
}
