//! Duration literals.
//!
//! Accepted forms:
//! - a bare number of seconds: `90`, `1.5`
//! - unit-suffixed segments: `250ms`, `1h30m`, `2d12h`, `1.5s`
//! - clock form: `hh:mm`, `hh:mm:ss`, `hh:mm:ss.fff`, optionally prefixed by
//!   a day count and a dot (`1.02:00:00`)

use std::time::Duration;

const UNITS: &[(&str, f64)] = &[
    ("ns", 1e-9),
    ("us", 1e-6),
    ("ms", 1e-3),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
    ("d", 86_400.0),
    ("w", 604_800.0),
];

pub fn parse_duration(input: &str) -> Result<Duration, String> {
    if input.is_empty() {
        return Err("empty duration".to_string());
    }
    if input.contains(':') {
        return parse_clock(input);
    }
    if is_number(input) {
        return seconds(parse_number(input)?);
    }
    parse_segments(input)
}

fn parse_segments(input: &str) -> Result<Duration, String> {
    let mut total = Duration::ZERO;
    let mut rest = input;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("expected a number at '{}'", rest));
        }
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| !c.is_ascii_lowercase())
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let factor = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, factor)| *factor)
            .ok_or_else(|| {
                if unit.is_empty() {
                    format!("missing unit after '{}'", number)
                } else {
                    format!("unknown unit '{}'", unit)
                }
            })?;

        let segment = seconds(parse_number(number)? * factor)?;
        total = total
            .checked_add(segment)
            .ok_or_else(|| "duration overflow".to_string())?;
        rest = tail;
    }

    Ok(total)
}

fn parse_clock(input: &str) -> Result<Duration, String> {
    let (days, clock) = match input.split_once('.') {
        Some((days, clock)) if clock.contains(':') && days.chars().all(|c| c.is_ascii_digit()) => {
            (parse_number(days)?, clock)
        }
        _ => (0.0, input),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err("expected hh:mm or hh:mm:ss".to_string());
    }

    let hours = parse_number(parts[0])?;
    let minutes = parse_number(parts[1])?;
    let secs = match parts.get(2) {
        Some(s) => parse_number(s)?,
        None => 0.0,
    };
    if minutes >= 60.0 || secs >= 60.0 || parts[0].contains('.') || parts[1].contains('.') {
        return Err("clock field out of range".to_string());
    }

    seconds(days * 86_400.0 + hours * 3600.0 + minutes * 60.0 + secs)
}

fn is_number(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit()) && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn parse_number(s: &str) -> Result<f64, String> {
    if !is_number(s) || s.matches('.').count() > 1 {
        return Err(format!("invalid number '{}'", s));
    }
    s.parse::<f64>().map_err(|e| e.to_string())
}

fn seconds(value: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(value).map_err(|e| e.to_string())
}
