//! Parser module for command-line token streams
//!
//! This module contains the lexer, the positional partitioner and the
//! binder that turns lexed nodes into execution contexts.

pub mod types;
pub mod lexer;
pub mod partition;
pub mod binder;

// Re-exports
pub use types::ParseError;
pub use lexer::{Lexer, LexerError, TokenType};
pub use binder::{parse, BoundParameter, ExecutionContext, Parser};
