//! Process-wide compiled pattern cache.
//!
//! Value patterns are declared as strings on parameter specs and checked on
//! every bind, so each distinct pattern is compiled once and shared. Entries
//! are never replaced once inserted.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use regex_lite::Regex;

use crate::schema::types::SchemaError;

lazy_static::lazy_static! {
    static ref PATTERN_CACHE: RwLock<HashMap<String, Arc<Regex>>> = RwLock::new(HashMap::new());
}

/// Compile `pattern`, or return the already-compiled matcher for it.
pub fn compile_pattern(pattern: &str) -> Result<Arc<Regex>, SchemaError> {
    if let Some(regex) = PATTERN_CACHE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(pattern)
    {
        return Ok(Arc::clone(regex));
    }

    let compiled = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut cache = PATTERN_CACHE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let entry = cache.entry(pattern.to_string()).or_insert_with(|| {
        tracing::trace!(pattern, "compiled value pattern");
        Arc::new(compiled)
    });
    Ok(Arc::clone(entry))
}

/// Return the first value that does not match `pattern`.
pub fn first_mismatch<'a, I>(pattern: &str, values: I) -> Result<Option<&'a str>, SchemaError>
where
    I: IntoIterator<Item = &'a str>,
{
    let regex = compile_pattern(pattern)?;
    Ok(values.into_iter().find(|value| !regex.is_match(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_pattern_shares_matcher() {
        let a = compile_pattern(r"^cache-test-\d+$").unwrap();
        let b = compile_pattern(r"^cache-test-\d+$").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_match("cache-test-42"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = compile_pattern("[unclosed").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { pattern, .. } if pattern == "[unclosed"));
    }

    #[test]
    fn test_first_mismatch() {
        let values = ["1", "22", "abc", "x"];
        assert_eq!(
            first_mismatch(r"^\d+$", values.iter().copied()).unwrap(),
            Some("abc")
        );
        assert_eq!(first_mismatch(r"^\d+$", ["7"].iter().copied()).unwrap(), None);
    }
}
