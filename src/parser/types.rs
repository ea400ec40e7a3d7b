//! Parser Types
//!
//! The single diagnostic a failed run produces. Every variant renders as
//! one human-readable line.

use thiserror::Error;

use crate::ast::types::display_flag_name;
use crate::convert::value::ConversionError;
use crate::parser::lexer::LexerError;
use crate::schema::types::{Arity, SchemaError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected token '{token}' at position {index}: {message}")]
    UnexpectedToken {
        token: String,
        index: usize,
        message: String,
    },

    #[error("command '{command}' does not accept flags (got {})", display_flag_name(.flag))]
    CommandAcceptsNoFlags { command: String, flag: String },

    #[error("command '{command}' has no flag {}", display_flag_name(.flag))]
    UnknownFlag { command: String, flag: String },

    #[error("flag {} of command '{command}' expects {expected} value(s) but got {actual}", display_flag_name(.flag))]
    FlagArityViolation {
        command: String,
        flag: String,
        expected: Arity,
        actual: usize,
    },

    #[error("value '{value}' for flag {} of command '{command}' does not match pattern '{pattern}'", display_flag_name(.flag))]
    FlagPatternViolation {
        command: String,
        flag: String,
        value: String,
        pattern: String,
    },

    #[error("command '{command}' requires flag {}", display_flag_name(.flag))]
    MissingRequiredFlag { command: String, flag: String },

    #[error("command '{command}' does not accept positional arguments (got '{value}')")]
    CommandAcceptsNoPositionals { command: String, value: String },

    #[error("command '{command}' is missing required argument '{name}' (expects {expected})")]
    MissingRequiredPositional {
        command: String,
        name: String,
        expected: Arity,
    },

    #[error("value '{value}' for argument '{name}' of command '{command}' does not match pattern '{pattern}'")]
    PositionalPatternViolation {
        command: String,
        name: String,
        value: String,
        pattern: String,
    },

    #[error("too many arguments for command '{command}': unexpected '{}'", .unexpected.join(" "))]
    TooManyPositionals {
        command: String,
        unexpected: Vec<String>,
    },

    #[error("{parameter} of command '{command}': {source}")]
    Conversion {
        command: String,
        parameter: String,
        #[source]
        source: ConversionError,
    },

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),
}

impl ParseError {
    /// Schema inconsistencies are configuration bugs; everything else is an
    /// ordinary validation failure of the user's input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Short category name, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnexpectedToken { .. } => "UnexpectedToken",
            Self::CommandAcceptsNoFlags { .. } => "CommandAcceptsNoFlags",
            Self::UnknownFlag { .. } => "UnknownFlag",
            Self::FlagArityViolation { .. } => "FlagArityViolation",
            Self::FlagPatternViolation { .. } => "FlagPatternViolation",
            Self::MissingRequiredFlag { .. } => "MissingRequiredFlag",
            Self::CommandAcceptsNoPositionals { .. } => "CommandAcceptsNoPositionals",
            Self::MissingRequiredPositional { .. } => "MissingRequiredPositional",
            Self::PositionalPatternViolation { .. } => "PositionalPatternViolation",
            Self::TooManyPositionals { .. } => "TooManyPositionals",
            Self::Conversion { .. } => "ConversionError",
            Self::Schema(_) => "SchemaError",
        }
    }
}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        Self::UnexpectedToken {
            token: e.token,
            index: e.index,
            message: e.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message_names_range() {
        let err = ParseError::FlagArityViolation {
            command: "put".to_string(),
            flag: "items".to_string(),
            expected: Arity { min: 1, max: Some(2) },
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "flag --items of command 'put' expects 1..2 value(s) but got 3"
        );
    }

    #[test]
    fn test_messages_are_single_line() {
        let errors = vec![
            ParseError::UnknownFlag {
                command: "ls".to_string(),
                flag: "x".to_string(),
            },
            ParseError::TooManyPositionals {
                command: "ls".to_string(),
                unexpected: vec!["a".to_string(), "b".to_string()],
            },
            ParseError::Schema(SchemaError::DuplicateCommand {
                name: "ls".to_string(),
            }),
        ];
        for err in errors {
            assert!(!err.to_string().contains('\n'));
        }
    }

    #[test]
    fn test_only_schema_errors_are_fatal() {
        let lex: ParseError = LexerError::new("zz", 0, "expected a command name").into();
        assert!(!lex.is_fatal());
        assert_eq!(lex.kind(), "UnexpectedToken");
        assert!(ParseError::Schema(SchemaError::DuplicateCommand { name: "a".to_string() }).is_fatal());
    }
}
