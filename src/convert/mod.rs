//! Value conversion for bound parameter values.
//!
//! Stateless apart from the process-wide compiled pattern cache, and
//! independent of the lexer and binder.

pub mod duration;
pub mod pattern;
pub mod value;

pub use pattern::compile_pattern;
pub use value::{convert, convert_all, ConversionError, Decimal, Value, ValueKind};
