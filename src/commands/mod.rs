// src/commands/mod.rs
pub mod registry;
pub mod runner;
pub mod types;

pub use registry::CommandRegistry;
pub use runner::{RunOutcome, Runner};
pub use types::{Command, CommandResult};
