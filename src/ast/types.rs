//! Node Types for Command-Line Token Streams
//!
//! This module defines the tree produced by the lexer. A run yields an
//! ordered forest of sibling [`CommandNode`]s, each owning its flags and
//! positional values. Nodes are immutable once the lexer hands them out.

use std::fmt;

// =============================================================================
// LEAF VALUES
// =============================================================================

/// A single raw token bound as a flag value or positional value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueNode {
    pub raw: String,
    /// Index of the token in the original argument sequence
    pub index: usize,
}

/// A flag as written on the command line, before resolution against a spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagNode {
    /// Flag name with its leading dash(es) stripped
    pub given_name: String,
    pub index: usize,
    pub values: Vec<ValueNode>,
}

impl FlagNode {
    /// The flag name in the form the user typed it (`-n` or `--name`).
    pub fn display_name(&self) -> String {
        display_flag_name(&self.given_name)
    }

    pub fn raw_values(&self) -> Vec<String> {
        self.values.iter().map(|v| v.raw.clone()).collect()
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// One invocation in a (possibly multi-command) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    /// Resolved, space-joined command name
    pub name: String,
    /// Index of the first token of the command name
    pub index: usize,
    pub flag_nodes: Vec<FlagNode>,
    pub positional_nodes: Vec<ValueNode>,
}

impl CommandNode {
    /// Pre-order walk over this command and everything it owns, paired
    /// with each node's depth below the command.
    pub fn walk(&self) -> Vec<(usize, Node<'_>)> {
        let mut nodes = vec![(0, Node::Command(self))];
        for flag in &self.flag_nodes {
            nodes.push((1, Node::Flag(flag)));
            nodes.extend(flag.values.iter().map(|v| (2, Node::Value(v))));
        }
        nodes.extend(self.positional_nodes.iter().map(|v| (1, Node::Value(v))));
        nodes
    }

    pub fn raw_positionals(&self) -> Vec<String> {
        self.positional_nodes.iter().map(|v| v.raw.clone()).collect()
    }
}

/// Borrowed view over the three node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Command(&'a CommandNode),
    Flag(&'a FlagNode),
    Value(&'a ValueNode),
}

impl Node<'_> {
    pub fn index(&self) -> usize {
        match self {
            Node::Command(c) => c.index,
            Node::Flag(f) => f.index,
            Node::Value(v) => v.index,
        }
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Command(c) => write!(f, "command {}", c.name),
            Node::Flag(flag) => write!(f, "flag {}", flag.display_name()),
            Node::Value(v) => write!(f, "value {:?}", v.raw),
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for flag in &self.flag_nodes {
            write!(f, " {}", flag.display_name())?;
            for value in &flag.values {
                write!(f, " {}", value.raw)?;
            }
        }
        for value in &self.positional_nodes {
            write!(f, " {}", value.raw)?;
        }
        Ok(())
    }
}

/// Render a stripped flag name with the dash prefix it must have had.
pub fn display_flag_name(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{}", name)
    } else {
        format!("--{}", name)
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Factory helpers for building nodes
pub struct AST;

impl AST {
    pub fn value(raw: impl Into<String>, index: usize) -> ValueNode {
        ValueNode {
            raw: raw.into(),
            index,
        }
    }

    pub fn flag(given_name: impl Into<String>, index: usize, values: Vec<ValueNode>) -> FlagNode {
        FlagNode {
            given_name: given_name.into(),
            index,
            values,
        }
    }

    pub fn command(
        name: impl Into<String>,
        index: usize,
        flag_nodes: Vec<FlagNode>,
        positional_nodes: Vec<ValueNode>,
    ) -> CommandNode {
        CommandNode {
            name: name.into(),
            index,
            flag_nodes,
            positional_nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommandNode {
        AST::command(
            "db migrate",
            0,
            vec![AST::flag("fast", 2, vec![]), AST::flag("n", 3, vec![AST::value("5", 4)])],
            vec![AST::value("a.sql", 5)],
        )
    }

    #[test]
    fn test_display_renders_tokens() {
        assert_eq!(sample().to_string(), "db migrate --fast -n 5 a.sql");
    }

    #[test]
    fn test_walk_is_pre_order() {
        let cmd = sample();
        let kinds: Vec<(usize, String)> = cmd.walk().iter().map(|(d, n)| (*d, n.to_string())).collect();
        assert_eq!(
            kinds,
            vec![
                (0, "command db migrate".to_string()),
                (1, "flag --fast".to_string()),
                (1, "flag -n".to_string()),
                (2, "value \"5\"".to_string()),
                (1, "value \"a.sql\"".to_string()),
            ]
        );
        let indexes: Vec<usize> = cmd.walk().iter().map(|(_, n)| n.index()).collect();
        assert_eq!(indexes, vec![0, 2, 3, 4, 5]);
    }

    #[test]
    fn test_display_flag_name() {
        assert_eq!(display_flag_name("v"), "-v");
        assert_eq!(display_flag_name("dry-run"), "--dry-run");
    }
}
