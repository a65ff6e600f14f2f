//! Conversion between typed values and database strings.
//!
//! [`format`] turns a [`Value`] into the text bound for a column and [`parse`]
//! turns a raw database string back into a [`Value`]. Neither ever fails: bad
//! numbers degrade to zero and unreadable dates to NULL.

use crate::column::{ColumnType, DECIMAL_PRECISION, KeyKind};
use crate::value::Value;
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use regex::Regex;
use std::num::IntErrorKind;
use std::sync::OnceLock;

/// Storage format for date/time columns.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LENIENT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

fn int_prefix() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[+-]?\d+").ok()).as_ref()
}

fn float_prefix() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").ok())
        .as_ref()
}

/// Integer value of the leading numeric prefix of `s`, or 0.
///
/// `"12,35"` reads as 12, `"  -7px"` as -7 and `"abc"` as 0. A prefix too
/// large for `i64` saturates to `i64::MAX` or `i64::MIN`.
pub fn leading_int(s: &str) -> i64 {
    let Some(digits) = int_prefix().and_then(|re| re.find(s)) else {
        return 0;
    };
    let digits = digits.as_str().trim();
    match digits.parse::<i64>() {
        Ok(n) => n,
        Err(e) => match e.kind() {
            IntErrorKind::NegOverflow => i64::MIN,
            IntErrorKind::PosOverflow => i64::MAX,
            _ => 0,
        },
    }
}

/// Float value of the leading numeric prefix of `s`, or 0.0.
pub fn leading_float(s: &str) -> f64 {
    float_prefix()
        .and_then(|re| re.find(s))
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn is_numeric(s: &str) -> bool {
    float_prefix()
        .and_then(|re| re.find(s))
        .is_some_and(|m| m.len() == s.len())
}

fn is_explicit_zero(value: &Value) -> bool {
    match value {
        Value::Int(0) => true,
        Value::Double(f) => *f == 0.0,
        Value::Text(s) => s == "0",
        _ => false,
    }
}

/// Format a typed value for a column of the given type.
///
/// `None` means SQL NULL.
pub fn format(
    value: &Value,
    column_type: &ColumnType,
    nullable: bool,
    tz: FixedOffset,
) -> Option<String> {
    match column_type {
        ColumnType::Boolean => format_bool(value, nullable),
        ColumnType::Integer => format_int(value, nullable, tz),
        ColumnType::Decimal => format_decimal(value, nullable, tz),
        ColumnType::DateTime => format_datetime_value(value, tz),
        ColumnType::Relationship(rel) => match rel.key_kind {
            KeyKind::Integer => format_int(value, nullable, tz),
            KeyKind::String => format_string(value, tz),
        },
        ColumnType::Enum(_) | ColumnType::Serialized(_) | ColumnType::String => {
            format_string(value, tz)
        }
    }
}

/// Parse a raw database string for a column of the given type.
///
/// NULL parses to [`Value::Null`] for every type.
pub fn parse(raw: Option<&str>, column_type: &ColumnType, tz: FixedOffset) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };
    match column_type {
        ColumnType::Boolean => Value::Bool(!matches!(raw, "0" | "false" | "")),
        ColumnType::Integer => Value::Int(leading_int(raw)),
        ColumnType::Decimal => Value::Double(leading_float(raw)),
        ColumnType::DateTime => parse_datetime(raw, tz, Utc::now())
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        ColumnType::Serialized(prototype) => Value::Object(prototype.reload_from(raw)),
        ColumnType::Enum(backing) => {
            if backing.iter().any(|b| *b == raw) {
                Value::Text(raw.to_string())
            } else {
                tracing::trace!(raw, "unknown enum backing value");
                Value::Null
            }
        }
        ColumnType::Relationship(rel) => match rel.key_kind {
            KeyKind::Integer => Value::Int(leading_int(raw)),
            KeyKind::String => Value::Text(raw.to_string()),
        },
        ColumnType::String => Value::Text(raw.to_string()),
    }
}

fn format_bool(value: &Value, nullable: bool) -> Option<String> {
    let truthy = match value {
        Value::Null => return if nullable { None } else { Some("0".into()) },
        Value::Bool(b) => *b,
        Value::Int(i) => *i > 0,
        Value::Double(f) => *f > 0.0,
        Value::Text(s) => {
            let trimmed = s.trim();
            if s.is_empty() || s == "false" {
                false
            } else if is_numeric(trimmed) {
                leading_float(trimmed) > 0.0
            } else {
                true
            }
        }
        Value::Array(items) => !items.is_empty(),
        Value::DateTime(_) | Value::Object(_) => true,
    };
    Some(if truthy { "1" } else { "0" }.to_string())
}

fn format_int(value: &Value, nullable: bool, tz: FixedOffset) -> Option<String> {
    if is_explicit_zero(value) {
        return Some("0".to_string());
    }
    let int = match value {
        Value::Null => return if nullable { None } else { Some("0".into()) },
        Value::Text(s) if s.trim().is_empty() => {
            return if nullable { None } else { Some("0".into()) };
        }
        Value::Int(i) => *i,
        Value::Double(f) => f.trunc() as i64,
        Value::Bool(b) => i64::from(*b),
        Value::Text(s) => leading_int(s),
        Value::DateTime(dt) => dt.with_timezone(&tz).timestamp(),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(o) => leading_int(&o.to_sql_string()),
    };
    Some(int.to_string())
}

fn format_decimal(value: &Value, nullable: bool, tz: FixedOffset) -> Option<String> {
    let float = match value {
        Value::Null => {
            if nullable {
                return None;
            }
            0.0
        }
        Value::Double(f) => *f,
        Value::Int(i) => *i as f64,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Text(s) => leading_float(s),
        Value::DateTime(dt) => dt.with_timezone(&tz).timestamp() as f64,
        Value::Array(items) => f64::from(u8::from(!items.is_empty())),
        Value::Object(o) => leading_float(&o.to_sql_string()),
    };
    Some(format!("{:.*}", DECIMAL_PRECISION, float))
}

fn format_datetime_value(value: &Value, tz: FixedOffset) -> Option<String> {
    match value {
        Value::DateTime(dt) => Some(format_datetime(*dt, tz)),
        Value::Text(s) if s.is_empty() => None,
        Value::Text(s) => parse_datetime(s, tz, Utc::now()).map(|dt| format_datetime(dt, tz)),
        Value::Int(secs) => Utc
            .timestamp_opt(*secs, 0)
            .single()
            .map(|dt| format_datetime(dt, tz)),
        _ => None,
    }
}

fn format_string(value: &Value, tz: FixedOffset) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Double(f) => Some(f.to_string()),
        Value::DateTime(dt) => Some(format_datetime(*dt, tz)),
        Value::Object(o) => Some(o.to_sql_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| format_string(item, tz))
                .collect::<Vec<_>>()
                .join(","),
        ),
    }
}

/// Format a timestamp in the given timezone using [`DATETIME_FORMAT`].
pub fn format_datetime(dt: DateTime<Utc>, tz: FixedOffset) -> String {
    dt.with_timezone(&tz).format(DATETIME_FORMAT).to_string()
}

fn from_local(naive: NaiveDateTime, tz: FixedOffset) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn midnight(date: NaiveDate, tz: FixedOffset) -> Option<DateTime<Utc>> {
    from_local(date.and_time(NaiveTime::MIN), tz)
}

/// Parse a date/time string, interpreting zone-less input in `tz`.
///
/// The storage format is tried first, then ISO-8601 / RFC 3339 variants,
/// date-only and time-only values, the words `now`, `today`, `yesterday` and
/// `tomorrow`, and `@<unix seconds>`. `now` anchors the relative forms.
pub fn parse_datetime(raw: &str, tz: FixedOffset, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
        return from_local(naive, tz);
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let today = now.with_timezone(&tz).date_naive();
    match trimmed.to_ascii_lowercase().as_str() {
        "now" => return now.with_nanosecond(0),
        "today" | "midnight" => return midnight(today, tz),
        "yesterday" => return midnight(today - Duration::days(1), tz),
        "tomorrow" => return midnight(today + Duration::days(1), tz),
        _ => {}
    }

    if let Some(secs) = trimmed.strip_prefix('@') {
        return secs
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in LENIENT_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return from_local(naive, tz);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return midnight(date, tz);
        }
    }
    for fmt in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, fmt) {
            return from_local(today.and_time(time), tz);
        }
    }

    tracing::debug!(raw, "unparseable date/time value");
    None
}
