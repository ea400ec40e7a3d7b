//! Shell-style front-end helpers.

pub mod line_splitter;

pub use line_splitter::{split_line, SplitError};
