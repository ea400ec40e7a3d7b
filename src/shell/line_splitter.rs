//! Quote-Aware Line Splitting
//!
//! Turns one line of text into an argument vector for front ends that take
//! a whole command line (an interactive prompt, `--line` on the CLI). It
//! only produces tokens; the grammar itself never sees quotes.
//!
//! Splitting follows POSIX shell word rules as implemented by `shell-words`:
//! single quotes are literal, double quotes honor `\"`, `\\`, `\$` and
//! `` \` `` escapes, and an unquoted `#` starts a comment.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("missing closing quote in line")]
    UnterminatedQuote,
}

impl From<shell_words::ParseError> for SplitError {
    fn from(_: shell_words::ParseError) -> Self {
        SplitError::UnterminatedQuote
    }
}

pub fn split_line(line: &str) -> Result<Vec<String>, SplitError> {
    let words = shell_words::split(line)?;
    tracing::trace!(words = words.len(), "split line");
    Ok(words)
}
