//! Positional Partitioning
//!
//! Distributes a command's positional tokens across its ordered positional
//! specs in one left-to-right pass. Each spec takes as many tokens as its
//! maximum allows while leaving enough for the declared minimums of the
//! specs after it; a variadic last spec takes everything that is left.
//! No backtracking, linear in the number of tokens.

use std::collections::VecDeque;

use crate::convert::pattern::first_mismatch;
use crate::parser::types::ParseError;
use crate::schema::types::{check_variadic_tail, Arity, ParameterSpec};

/// Tokens assigned to one positional spec.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'s> {
    pub spec: &'s ParameterSpec,
    pub values: Vec<String>,
}

pub fn partition_positionals<'s>(
    command: &str,
    specs: &'s [ParameterSpec],
    tokens: &[String],
) -> Result<Vec<Partition<'s>>, ParseError> {
    check_variadic_tail(command, specs)?;

    if specs.is_empty() {
        return match tokens.first() {
            Some(value) => Err(ParseError::CommandAcceptsNoPositionals {
                command: command.to_string(),
                value: value.clone(),
            }),
            None => Ok(Vec::new()),
        };
    }

    // reserved[i] = sum of effective minimums of specs after i
    let mut reserved = vec![0usize; specs.len()];
    for i in (0..specs.len() - 1).rev() {
        reserved[i] = reserved[i + 1] + specs[i + 1].effective_min();
    }

    let mut remaining: VecDeque<String> = tokens.iter().cloned().collect();
    let mut partitions = Vec::with_capacity(specs.len());
    let last = specs.len() - 1;

    for (i, spec) in specs.iter().enumerate() {
        let take = match spec.max_values {
            None if i == last => remaining.len(),
            max => {
                let available = remaining.len().saturating_sub(reserved[i]);
                max.map_or(available, |max| available.min(max))
            }
        };

        if take < spec.effective_min() {
            return Err(ParseError::MissingRequiredPositional {
                command: command.to_string(),
                name: spec.name.clone(),
                expected: Arity {
                    min: spec.effective_min(),
                    max: spec.max_values,
                },
            });
        }

        let values: Vec<String> = remaining.drain(..take).collect();
        if let Some(pattern) = &spec.value_pattern {
            if let Some(value) = first_mismatch(pattern, values.iter().map(|v| v.as_str()))? {
                return Err(ParseError::PositionalPatternViolation {
                    command: command.to_string(),
                    name: spec.name.clone(),
                    value: value.to_string(),
                    pattern: pattern.clone(),
                });
            }
        }

        partitions.push(Partition { spec, values });
    }

    if !remaining.is_empty() {
        return Err(ParseError::TooManyPositionals {
            command: command.to_string(),
            unexpected: remaining.into_iter().collect(),
        });
    }

    Ok(partitions)
}
