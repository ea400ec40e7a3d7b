// src/commands/runner.rs
//! Sequential execution of a parsed run.
//!
//! The whole argument vector is parsed before anything executes, so a
//! lexing or validation failure anywhere means no command runs. Execution
//! then proceeds in order and stops at the first non-zero exit code.

use super::registry::CommandRegistry;
use super::types::CommandResult;
use crate::parser::{ParseError, Parser};
use crate::schema::SchemaError;

/// Results of the commands that actually ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// `(command name, result)` in execution order
    pub results: Vec<(String, CommandResult)>,
    /// A command failed before the last one was reached
    pub stopped_early: bool,
}

impl RunOutcome {
    /// Exit code of the last command that ran, 0 for an empty run.
    pub fn exit_code(&self) -> i32 {
        self.results.last().map_or(0, |(_, result)| result.exit_code)
    }
}

pub struct Runner<'r> {
    registry: &'r CommandRegistry,
}

impl<'r> Runner<'r> {
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self { registry }
    }

    pub async fn run(&self, tokens: &[String]) -> Result<RunOutcome, ParseError> {
        let contexts = Parser::new(self.registry).parse(tokens)?;
        let total = contexts.len();
        let mut results = Vec::with_capacity(total);

        for ctx in &contexts {
            let command = self.registry.get(ctx.command_name()).ok_or_else(|| {
                SchemaError::MissingSchema {
                    name: ctx.command_name().to_string(),
                }
            })?;

            tracing::debug!(command = ctx.command_name(), "executing command");
            let result = command.execute(ctx).await;
            let failed = !result.is_success();
            results.push((ctx.command_name().to_string(), result));

            if failed {
                tracing::warn!(
                    command = ctx.command_name(),
                    executed = results.len(),
                    total,
                    "command failed, stopping run"
                );
                break;
            }
        }

        Ok(RunOutcome {
            stopped_early: results.len() < total,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::Command;
    use crate::parser::ExecutionContext;
    use crate::schema::{CommandSchema, ParameterSpec};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        name: &'static str,
        exit_code: i32,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Command for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn schema(&self) -> CommandSchema {
            CommandSchema::new(self.name)
                .flag(ParameterSpec::flag("fail").arity(0, 0))
                .positional(ParameterSpec::positional("args", 0).arity(0, 0).variadic())
        }

        async fn execute(&self, ctx: &ExecutionContext) -> CommandResult {
            self.log.lock().unwrap().push(ctx.command_name().to_string());
            if ctx.has_flag("fail") {
                CommandResult::with_exit_code(String::new(), "failed\n".to_string(), self.exit_code.max(1))
            } else {
                CommandResult::success(ctx.raw_positional_tokens().join(" "))
            }
        }
    }

    fn registry(log: &Arc<Mutex<Vec<String>>>) -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        for name in ["build", "test", "deploy"] {
            registry
                .register(Box::new(Recorder {
                    name,
                    exit_code: 3,
                    log: Arc::clone(log),
                }))
                .unwrap();
        }
        registry
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_runs_all_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);
        let outcome = Runner::new(&registry)
            .run(&args(&["build", "a", "test", "deploy", "prod"]))
            .await
            .unwrap();

        assert!(!outcome.stopped_early);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(*log.lock().unwrap(), vec!["build", "test", "deploy"]);
        assert_eq!(outcome.results[2].1.stdout, "prod");
    }

    #[tokio::test]
    async fn test_stops_after_failed_command() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);
        let outcome = Runner::new(&registry)
            .run(&args(&["build", "test", "--fail", "deploy"]))
            .await
            .unwrap();

        assert!(outcome.stopped_early);
        assert_eq!(outcome.exit_code(), 3);
        assert_eq!(*log.lock().unwrap(), vec!["build", "test"]);
    }

    #[tokio::test]
    async fn test_validation_failure_runs_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);
        let err = Runner::new(&registry)
            .run(&args(&["build", "test", "--nope", "deploy"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ParseError::UnknownFlag { .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_run() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);
        let outcome = Runner::new(&registry).run(&[]).await.unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_registry_rejects_invalid_schema() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CommandRegistry::new();
        let err = registry
            .register(Box::new(Recorder {
                name: "Build",
                exit_code: 1,
                log,
            }))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidCommandName { .. }));
        assert!(!registry.contains("Build"));
    }
}
