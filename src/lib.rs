//! just-argv - A command-line grammar engine and argument binder
//!
//! This library turns a flat argument vector into validated, ready-to-run
//! command invocations: composite command names are resolved by greedy
//! longest match, flags are separated from positionals (honoring the `--`
//! sentinel), and positional tokens are partitioned across declared slots.
//!
//! ```
//! use just_argv::{parse, CommandSchema, ParameterSpec, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new()
//!     .with(
//!         CommandSchema::new("db migrate")
//!             .flag(ParameterSpec::flag("fast").arity(0, 0))
//!             .positional(ParameterSpec::positional("target", 0)),
//!     )
//!     .unwrap();
//!
//! let tokens: Vec<String> = ["db", "migrate", "v2", "--fast"].iter().map(|s| s.to_string()).collect();
//! let contexts = parse(&tokens, &registry).unwrap();
//! assert_eq!(contexts[0].command_name(), "db migrate");
//! assert!(contexts[0].has_flag("fast"));
//! ```

pub mod ast;
pub mod commands;
pub mod convert;
pub mod parser;
pub mod schema;
pub mod shell;

pub use ast::types::*;
pub use parser::{parse, BoundParameter, ExecutionContext, ParseError, Parser};
pub use schema::{CommandSchema, ParameterSpec, SchemaProvider, SchemaRegistry};
