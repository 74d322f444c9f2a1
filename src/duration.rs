//! Human duration strings ("5m", "90s", "1h30m", "250ms") to milliseconds.
//!
//! Accepts the cluster's time units (`nanos`, `micros`, `ms`, `s`, `m`, `h`, `d`) plus the
//! usual long forms. A bare number is taken as milliseconds.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DurationError {
    #[error("empty duration string")]
    Empty,
    #[error("unrecognised duration {0:?}")]
    Malformed(String),
    #[error("unknown time unit {unit:?} in {input:?}")]
    UnknownUnit { unit: String, input: String },
}

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

fn whole_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:\d+(?:\.\d+)?\s*[a-zµ]*\s*,?\s*)+$").expect("static regex")
    })
}

fn term_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)\s*([a-zµ]*)").expect("static regex"))
}

/// Milliseconds in one `unit`, or None for an unknown unit.
fn unit_millis(unit: &str) -> Option<f64> {
    let ms = match unit {
        "" | "ms" | "msec" | "millis" | "millisecond" | "milliseconds" => 1.0,
        "nanos" | "ns" | "nanosecond" | "nanoseconds" => 1e-6,
        "micros" | "us" | "µs" | "microsecond" | "microseconds" => 1e-3,
        "s" | "sec" | "secs" | "second" | "seconds" => MS_PER_SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" => MS_PER_MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => MS_PER_HOUR,
        "d" | "day" | "days" => MS_PER_DAY,
        "w" | "wk" | "week" | "weeks" => 7.0 * MS_PER_DAY,
        _ => return None,
    };
    Some(ms)
}

/// Parse a duration string into milliseconds. Terms are summed, so `"1h30m"` is 5 400 000.
pub fn parse_duration(input: &str) -> Result<f64, DurationError> {
    let lowered = input.trim().to_lowercase();
    if lowered.is_empty() {
        return Err(DurationError::Empty);
    }
    if !whole_pattern().is_match(&lowered) {
        return Err(DurationError::Malformed(input.to_string()));
    }

    let mut total = 0.0;
    for caps in term_pattern().captures_iter(&lowered) {
        let value: f64 = caps[1]
            .parse()
            .map_err(|_| DurationError::Malformed(input.to_string()))?;
        let unit = &caps[2];
        let factor = unit_millis(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;
        total += value * factor;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cluster_units() {
        assert_eq!(parse_duration("5m").unwrap(), 300_000.0);
        assert_eq!(parse_duration("30s").unwrap(), 30_000.0);
        assert_eq!(parse_duration("1h").unwrap(), 3_600_000.0);
        assert_eq!(parse_duration("2d").unwrap(), 172_800_000.0);
        assert_eq!(parse_duration("250ms").unwrap(), 250.0);
        assert_eq!(parse_duration("1500micros").unwrap(), 1.5);
    }

    #[test]
    fn sums_compound_terms() {
        assert_eq!(parse_duration("1h30m").unwrap(), 5_400_000.0);
        assert_eq!(parse_duration("1 min, 30 sec").unwrap(), 90_000.0);
    }

    #[test]
    fn bare_number_is_millis() {
        assert_eq!(parse_duration("1200").unwrap(), 1200.0);
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        assert_eq!(parse_duration("  15M ").unwrap(), 900_000.0);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert!(matches!(parse_duration("soon"), Err(DurationError::Malformed(_))));
        assert!(matches!(
            parse_duration("5 fortnights"),
            Err(DurationError::UnknownUnit { .. })
        ));
    }
}
