// src/commands/types.rs
use async_trait::async_trait;

use crate::parser::ExecutionContext;
use crate::schema::CommandSchema;

/// Outcome of executing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(stdout: String) -> Self {
        Self { stdout, stderr: String::new(), exit_code: 0 }
    }

    pub fn with_exit_code(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self { stdout, stderr, exit_code }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// An executable command. Its schema is what the binder validates against;
/// `execute` only ever sees contexts that passed validation.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;
    fn schema(&self) -> CommandSchema;
    async fn execute(&self, ctx: &ExecutionContext) -> CommandResult;
}
