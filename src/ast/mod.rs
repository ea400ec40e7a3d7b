//! Node Model for Tokenized Command Lines
//!
//! Architecture:
//!   argv → Lexer → [CommandNode] → Binder(schema) → [ExecutionContext] → Runner

pub mod types;
