//! Lexer for Command-Line Token Streams
//!
//! The lexer classifies an already-split argument vector into a forest of
//! command nodes. It handles:
//! - Composite (multi-word) command names, resolved by greedy longest match
//! - Short (`-x`) and long (`--name`) flags with greedily consumed values
//! - The `--` sentinel, which toggles flag interpretation off and on
//! - Positional values
//!
//! Lexing is all-or-nothing: the first token that cannot be classified
//! aborts the run and no nodes are returned.

use std::collections::HashSet;
use std::fmt;

use crate::ast::types::{CommandNode, ValueNode, AST};

/// Literal token that toggles flag parsing for the rest of a command.
pub const SENTINEL: &str = "--";

/// Classification of a single raw token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Bare alias: lowercase letters with single internal dashes
    Alias,
    /// `-x`
    ShortFlag,
    /// `--name`
    LongFlag,
    /// `--`
    Sentinel,
    /// Starts with a dash but is neither a valid flag nor the sentinel
    MalformedFlag,
    /// Anything else
    Word,
}

impl TokenType {
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::ShortFlag | Self::LongFlag)
    }
}

/// Classify one token.
pub fn classify(token: &str) -> TokenType {
    if token == SENTINEL {
        TokenType::Sentinel
    } else if let Some(long) = token.strip_prefix("--") {
        if is_valid_alias(long) {
            TokenType::LongFlag
        } else {
            TokenType::MalformedFlag
        }
    } else if let Some(short) = token.strip_prefix('-') {
        let mut chars = short.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_lowercase() => TokenType::ShortFlag,
            _ => TokenType::MalformedFlag,
        }
    } else if is_valid_alias(token) {
        TokenType::Alias
    } else {
        TokenType::Word
    }
}

/// Lowercase ASCII letters and single internal dashes; no leading,
/// trailing or doubled dash.
pub fn is_valid_alias(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.chars().all(|c| c.is_ascii_lowercase() || c == '-')
}

/// Strip the dash prefix from a token already classified as a flag.
fn flag_name(token: &str) -> &str {
    token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
        .unwrap_or(token)
}

/// Error raised when a token cannot be classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub token: String,
    pub index: usize,
    pub message: String,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected token '{}' at position {}: {}",
            self.token, self.index, self.message
        )
    }
}

impl std::error::Error for LexerError {}

impl LexerError {
    pub fn new(token: impl Into<String>, index: usize, message: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            index,
            message: message.into(),
        }
    }
}

/// Lexer over one argument vector
pub struct Lexer<'a> {
    tokens: &'a [String],
    pos: usize,
    known: HashSet<String>,
    /// Every space-joined word prefix of a known name, to stop extending early
    prefixes: HashSet<String>,
}

impl<'a> Lexer<'a> {
    pub fn new<I, S>(tokens: &'a [String], command_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known: HashSet<String> = command_names.into_iter().map(Into::into).collect();
        let mut prefixes = HashSet::new();
        for name in &known {
            let mut prefix = String::new();
            for word in name.split(' ') {
                if !prefix.is_empty() {
                    prefix.push(' ');
                }
                prefix.push_str(word);
                prefixes.insert(prefix.clone());
            }
        }

        Self {
            tokens,
            pos: 0,
            known,
            prefixes,
        }
    }

    /// Tokenize the entire input into sibling command nodes
    pub fn tokenize(mut self) -> Result<Vec<CommandNode>, LexerError> {
        let mut commands = Vec::new();

        while self.pos < self.tokens.len() {
            let command = self.read_command()?;
            tracing::trace!(command = %command.name, index = command.index, "lexed command");
            commands.push(command);
        }

        Ok(commands)
    }

    fn current(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(|s| s.as_str())
    }

    /// Greedy longest match of a known command name starting at `start`.
    /// Returns the joined name and the number of tokens it spans.
    fn match_command(&self, start: usize) -> Option<(String, usize)> {
        let mut candidate = String::new();
        let mut best = None;

        for (offset, token) in self.tokens[start..].iter().enumerate() {
            if classify(token) != TokenType::Alias {
                break;
            }
            if offset > 0 {
                candidate.push(' ');
            }
            candidate.push_str(token);

            if self.known.contains(&candidate) {
                best = Some((candidate.clone(), offset + 1));
            }
            if !self.prefixes.contains(&candidate) {
                break;
            }
        }

        best
    }

    fn starts_command(&self) -> bool {
        self.pos < self.tokens.len() && self.match_command(self.pos).is_some()
    }

    fn read_command(&mut self) -> Result<CommandNode, LexerError> {
        let start = self.pos;
        let (name, span) = match self.match_command(start) {
            Some(found) => found,
            None => {
                let token = self.current().unwrap_or_default();
                let message = if classify(token) == TokenType::MalformedFlag {
                    "malformed flag"
                } else {
                    "expected a command name"
                };
                return Err(LexerError::new(token, start, message));
            }
        };
        self.pos += span;

        let mut flag_nodes = Vec::new();
        let mut positional_nodes = Vec::new();
        let mut stop_options = false;

        while let Some(token) = self.current() {
            if self.starts_command() {
                break;
            }

            let token_type = classify(token);
            if token_type == TokenType::Sentinel {
                stop_options = !stop_options;
                self.pos += 1;
                continue;
            }

            if stop_options {
                positional_nodes.push(AST::value(token, self.pos));
                self.pos += 1;
                continue;
            }

            match token_type {
                flag if flag.is_flag() => {
                    let index = self.pos;
                    self.pos += 1;
                    let values = self.read_flag_values()?;
                    flag_nodes.push(AST::flag(flag_name(token), index, values));
                }
                TokenType::MalformedFlag => {
                    return Err(LexerError::new(token, self.pos, "malformed flag"));
                }
                _ => {
                    positional_nodes.push(AST::value(token, self.pos));
                    self.pos += 1;
                }
            }
        }

        Ok(AST::command(name, start, flag_nodes, positional_nodes))
    }

    /// Values run until the next flag, the sentinel, a new command, or the end.
    fn read_flag_values(&mut self) -> Result<Vec<ValueNode>, LexerError> {
        let mut values = Vec::new();

        while let Some(token) = self.current() {
            if self.starts_command() {
                break;
            }
            match classify(token) {
                kind if kind.is_flag() || kind == TokenType::Sentinel => break,
                TokenType::MalformedFlag => {
                    return Err(LexerError::new(token, self.pos, "malformed flag"));
                }
                _ => {
                    values.push(AST::value(token, self.pos));
                    self.pos += 1;
                }
            }
        }

        Ok(values)
    }
}

/// Lex `tokens` against the given command names.
pub fn tokenize<I, S>(tokens: &[String], command_names: I) -> Result<Vec<CommandNode>, LexerError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Lexer::new(tokens, command_names).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn names() -> Vec<&'static str> {
        vec!["db", "db migrate", "db migrate run", "ls"]
    }

    fn flag_summary(cmd: &CommandNode) -> Vec<(String, Vec<String>)> {
        cmd.flag_nodes
            .iter()
            .map(|f| (f.given_name.clone(), f.raw_values()))
            .collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("db"), TokenType::Alias);
        assert_eq!(classify("dry-run"), TokenType::Alias);
        assert_eq!(classify("a.txt"), TokenType::Word);
        assert_eq!(classify("Db"), TokenType::Word);
        assert_eq!(classify("-n"), TokenType::ShortFlag);
        assert_eq!(classify("--dry-run"), TokenType::LongFlag);
        assert_eq!(classify("--"), TokenType::Sentinel);
        assert_eq!(classify("-"), TokenType::MalformedFlag);
        assert_eq!(classify("-nv"), TokenType::MalformedFlag);
        assert_eq!(classify("-N"), TokenType::MalformedFlag);
        assert_eq!(classify("--dry--run"), TokenType::MalformedFlag);
        assert_eq!(classify("--dry-"), TokenType::MalformedFlag);
        assert_eq!(classify("---x"), TokenType::MalformedFlag);
        assert_eq!(classify("-5"), TokenType::MalformedFlag);
    }

    #[test]
    fn test_is_valid_alias() {
        assert!(is_valid_alias("a"));
        assert!(is_valid_alias("dry-run-now"));
        assert!(!is_valid_alias(""));
        assert!(!is_valid_alias("-a"));
        assert!(!is_valid_alias("a-"));
        assert!(!is_valid_alias("a--b"));
        assert!(!is_valid_alias("a1"));
        assert!(!is_valid_alias("a_b"));
    }

    #[test]
    fn test_greedy_composite_match() {
        let tokens = args(&["db", "migrate", "run", "--dry-run"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name, "db migrate run");
        assert_eq!(flag_summary(&commands[0]), vec![("dry-run".to_string(), vec![])]);
    }

    #[test]
    fn test_overlap_then_next_command() {
        let tokens = args(&["db", "migrate", "--fast", "db"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].name, "db migrate");
        assert_eq!(flag_summary(&commands[0]), vec![("fast".to_string(), vec![])]);
        assert_eq!(commands[1].name, "db");
        assert_eq!(commands[1].index, 3);
    }

    #[test]
    fn test_longest_match_backs_off_to_recorded_best() {
        // "db migrate x" is not known: the match stays at "db migrate"
        let tokens = args(&["db", "migrate", "now"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(commands[0].name, "db migrate");
        assert_eq!(commands[0].raw_positionals(), vec!["now"]);
    }

    #[test]
    fn test_flag_values_are_greedy() {
        let tokens = args(&["ls", "-n", "5", "6", "--all", "x"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(
            flag_summary(&commands[0]),
            vec![
                ("n".to_string(), vec!["5".to_string(), "6".to_string()]),
                ("all".to_string(), vec!["x".to_string()]),
            ]
        );
        assert!(commands[0].positional_nodes.is_empty());
    }

    #[test]
    fn test_flag_values_stop_at_new_command() {
        let tokens = args(&["ls", "--path", "a", "db", "migrate"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(flag_summary(&commands[0]), vec![("path".to_string(), vec!["a".to_string()])]);
        assert_eq!(commands[1].name, "db migrate");
    }

    #[test]
    fn test_positionals_before_flags() {
        let tokens = args(&["ls", "a.txt", "b.txt", "--long"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(commands[0].raw_positionals(), vec!["a.txt", "b.txt"]);
        assert_eq!(flag_summary(&commands[0]), vec![("long".to_string(), vec![])]);
    }

    #[test]
    fn test_sentinel_disables_flags() {
        let tokens = args(&["ls", "--", "-n", "5"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert!(commands[0].flag_nodes.is_empty());
        assert_eq!(commands[0].raw_positionals(), vec!["-n", "5"]);
    }

    #[test]
    fn test_sentinel_ends_flag_values() {
        let tokens = args(&["ls", "-n", "5", "--", "-x"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(flag_summary(&commands[0]), vec![("n".to_string(), vec!["5".to_string()])]);
        assert_eq!(commands[0].raw_positionals(), vec!["-x"]);
    }

    #[test]
    fn test_sentinel_toggles_back_on() {
        let tokens = args(&["ls", "--", "-a", "--", "-b"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(commands[0].raw_positionals(), vec!["-a"]);
        assert_eq!(flag_summary(&commands[0]), vec![("b".to_string(), vec![])]);
    }

    #[test]
    fn test_sentinel_is_scoped_to_one_command() {
        let tokens = args(&["ls", "--", "-a", "db", "-b"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(commands[0].raw_positionals(), vec!["-a"]);
        assert_eq!(flag_summary(&commands[1]), vec![("b".to_string(), vec![])]);
    }

    #[test]
    fn test_unknown_first_token_fails_at_zero() {
        let tokens = args(&["deploy", "db"]);
        let err = tokenize(&tokens, names()).unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.token, "deploy");
    }

    #[test]
    fn test_flag_first_fails_at_zero() {
        let tokens = args(&["--verbose", "ls"]);
        let err = tokenize(&tokens, names()).unwrap_err();
        assert_eq!((err.index, err.token.as_str()), (0, "--verbose"));
    }

    #[test]
    fn test_malformed_flag_aborts() {
        for bad in ["--dry--run", "-nv", "-5", "-"] {
            let tokens = args(&["ls", "a", bad, "b"]);
            let err = tokenize(&tokens, names()).unwrap_err();
            assert_eq!(err.index, 2, "token {}", bad);
            assert_eq!(err.token, bad);
        }
    }

    #[test]
    fn test_malformed_flag_in_values_aborts() {
        let tokens = args(&["ls", "--n", "1", "--bad--flag"]);
        let err = tokenize(&tokens, names()).unwrap_err();
        assert_eq!(err.index, 3);
    }

    #[test]
    fn test_malformed_flag_after_sentinel_is_positional() {
        let tokens = args(&["ls", "--", "--bad--flag"]);
        let commands = tokenize(&tokens, names()).unwrap();
        assert_eq!(commands[0].raw_positionals(), vec!["--bad--flag"]);
    }

    #[test]
    fn test_empty_input() {
        let tokens: Vec<String> = Vec::new();
        assert!(tokenize(&tokens, names()).unwrap().is_empty());
    }

    #[test]
    fn test_no_known_commands() {
        let tokens = args(&["ls"]);
        let err = tokenize(&tokens, Vec::<String>::new()).unwrap_err();
        assert_eq!(err.index, 0);
    }

    #[test]
    fn test_value_indexes() {
        let tokens = args(&["db", "migrate", "-n", "5", "x"]);
        let commands = tokenize(&tokens, names()).unwrap();
        let cmd = &commands[0];
        assert_eq!(cmd.flag_nodes[0].index, 2);
        assert_eq!(cmd.flag_nodes[0].values[0].index, 3);
        assert_eq!(cmd.flag_nodes[0].values[1].index, 4);
    }
}
