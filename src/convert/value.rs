//! Scalar Value Conversion
//!
//! Converts raw string tokens to typed values. Every kind has one fixed,
//! locale-independent parsing rule; there is no fallback between kinds.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use url::Url;
use uuid::Uuid;

use super::duration::parse_duration;

/// The type a parameter's values are converted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Boolean,
    Integer,
    Float,
    Decimal,
    Uuid,
    Timestamp,
    Duration,
    Uri,
    /// Case-insensitive match against the listed variant names
    Enum(Vec<String>),
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Uuid => "uuid",
            Self::Timestamp => "timestamp",
            Self::Duration => "duration",
            Self::Uri => "uri",
            Self::Enum(_) => "enum",
        }
    }

    /// Resolve a type name as written in a schema document.
    pub fn from_name(name: &str, variants: Vec<String>) -> Result<Self, String> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "text" | "string" => Self::Text,
            "boolean" | "bool" => Self::Boolean,
            "integer" | "int" => Self::Integer,
            "float" | "double" => Self::Float,
            "decimal" => Self::Decimal,
            "uuid" | "guid" => Self::Uuid,
            "timestamp" | "datetime" => Self::Timestamp,
            "duration" | "timespan" => Self::Duration,
            "uri" | "url" => Self::Uri,
            "enum" => {
                if variants.is_empty() {
                    return Err("type = \"enum\" needs at least one variant".to_string());
                }
                return Ok(Self::Enum(variants));
            }
            other => return Err(format!("unknown value type '{}'", other)),
        };
        if !variants.is_empty() {
            return Err("variants are only allowed with type = \"enum\"".to_string());
        }
        Ok(kind)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum(variants) => write!(f, "one of {}", variants.join("|")),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Exact fixed-point number: `mantissa * 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    pub mantissa: i128,
    pub scale: u32,
}

const MAX_DECIMAL_SCALE: u32 = 28;

impl FromStr for Decimal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err("no digits".to_string());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err("invalid digit".to_string());
        }
        let scale = fraction.len() as u32;
        if scale > MAX_DECIMAL_SCALE {
            return Err(format!("more than {} fractional digits", MAX_DECIMAL_SCALE));
        }

        let digits = format!("{}{}", whole, fraction);
        let magnitude: i128 = digits.parse().map_err(|_| "number too large".to_string())?;
        Ok(Self {
            mantissa: if negative { -magnitude } else { magnitude },
            scale,
        })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = format!("{:0>width$}", self.mantissa.unsigned_abs(), width = self.scale as usize + 1);
        let (whole, fraction) = digits.split_at(digits.len() - self.scale as usize);
        let sign = if self.mantissa < 0 { "-" } else { "" };
        write!(f, "{}{}.{}", sign, whole, fraction)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A converted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Uuid(Uuid),
    Timestamp(DateTime<FixedOffset>),
    Duration(Duration),
    Uri(Url),
    /// Canonical spelling of the matched variant
    Enum(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Enum(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Uuid(u) => write!(f, "{}", u),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Duration(d) => write!(f, "{:?}", d),
            Self::Uri(u) => write!(f, "{}", u),
        }
    }
}

/// A raw token that could not be converted to the requested kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    pub value: String,
    pub kind: String,
    /// Position within a multi-value conversion
    pub index: Option<usize>,
    pub reason: String,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(
                f,
                "cannot convert value #{} '{}' to {}: {}",
                index + 1,
                self.value,
                self.kind,
                self.reason
            ),
            None => write!(
                f,
                "cannot convert '{}' to {}: {}",
                self.value, self.kind, self.reason
            ),
        }
    }
}

impl std::error::Error for ConversionError {}

/// Convert a single raw token.
pub fn convert(raw: &str, kind: &ValueKind) -> Result<Value, ConversionError> {
    convert_inner(raw, kind).map_err(|reason| ConversionError {
        value: raw.to_string(),
        kind: kind.name().to_string(),
        index: None,
        reason,
    })
}

/// Convert every token, failing on the first one that does not convert.
pub fn convert_all<S: AsRef<str>>(raws: &[S], kind: &ValueKind) -> Result<Vec<Value>, ConversionError> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| {
            convert(raw.as_ref(), kind).map_err(|e| ConversionError {
                index: Some(index),
                ..e
            })
        })
        .collect()
}

fn convert_inner(raw: &str, kind: &ValueKind) -> Result<Value, String> {
    match kind {
        ValueKind::Text => Ok(Value::Text(raw.to_string())),
        ValueKind::Boolean => parse_bool(raw).map(Value::Boolean),
        ValueKind::Integer => parse_integer(raw).map(Value::Integer),
        ValueKind::Float => parse_float(raw).map(Value::Float),
        ValueKind::Decimal => raw.parse::<Decimal>().map(Value::Decimal),
        ValueKind::Uuid => Uuid::parse_str(raw).map(Value::Uuid).map_err(|e| e.to_string()),
        ValueKind::Timestamp => parse_timestamp(raw).map(Value::Timestamp),
        ValueKind::Duration => parse_duration(raw).map(Value::Duration),
        ValueKind::Uri => Url::parse(raw).map(Value::Uri).map_err(|e| e.to_string()),
        ValueKind::Enum(variants) => variants
            .iter()
            .find(|variant| variant.eq_ignore_ascii_case(raw))
            .map(|variant| Value::Enum(variant.clone()))
            .ok_or_else(|| format!("expected one of {}", variants.join(", "))),
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err("expected true/false, yes/no, on/off or 1/0".to_string()),
    }
}

fn parse_integer(raw: &str) -> Result<i64, String> {
    let digits = raw.strip_prefix(&['-', '+'][..]).unwrap_or(raw);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("invalid digit".to_string());
    }
    raw.parse::<i64>().map_err(|_| "out of range".to_string())
}

fn parse_float(raw: &str) -> Result<f64, String> {
    let valid_chars = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !valid_chars || !raw.chars().any(|c| c.is_ascii_digit()) {
        return Err("invalid number".to_string());
    }
    let value = raw.parse::<f64>().map_err(|e| e.to_string())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err("out of range".to_string())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| "expected RFC 3339, YYYY-MM-DD HH:MM:SS or YYYY-MM-DD".to_string())
}
