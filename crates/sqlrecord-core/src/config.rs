//! Runtime configuration shared by the statement builder and the models.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::fmt;
use std::sync::Arc;

/// Source of the current time for auto-filled timestamp columns.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Dialect, timezone and clock used when talking to one database.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQL dialect (default: MySQL)
    pub dialect: Dialect,
    /// Timezone date/time values are stored in (default: UTC)
    pub timezone: FixedOffset,
    /// Clock for auto-filled timestamps
    pub clock: Arc<dyn Clock>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            timezone: utc_offset(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl Config {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SQL dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the storage timezone.
    pub fn timezone(mut self, tz: FixedOffset) -> Self {
        self.timezone = tz;
        self
    }

    /// Set the storage timezone from a string such as `"+02:00"`, `"-0530"`
    /// or `"UTC"`.
    #[allow(clippy::result_large_err)]
    pub fn timezone_str(self, tz: &str) -> Result<Self> {
        Ok(self.timezone(parse_timezone(tz)?))
    }

    /// Set the clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Current time from the configured clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Parse a fixed UTC offset.
#[allow(clippy::result_large_err)]
pub fn parse_timezone(tz: &str) -> Result<FixedOffset> {
    let trimmed = tz.trim();
    if matches!(trimmed.to_ascii_uppercase().as_str(), "UTC" | "Z" | "GMT") {
        return Ok(utc_offset());
    }

    let invalid = || Error::Custom(format!("invalid timezone offset '{}'", tz));

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };
    if !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return Err(invalid());
    }
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let digits = |part: &str| -> Result<i32> {
        if part.is_empty() || part.len() > 2 {
            return Err(invalid());
        }
        part.parse().map_err(|_| invalid())
    };
    let hours = digits(hours)?;
    let minutes = digits(minutes)?;
    if !(0..60).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug)]
    struct Frozen(DateTime<Utc>);

    impl Clock for Frozen {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.dialect, Dialect::Mysql);
        assert_eq!(config.timezone.local_minus_utc(), 0);
    }

    #[test]
    fn test_builder() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let config = Config::new()
            .dialect(Dialect::Postgres)
            .timezone_str("+02:00")
            .unwrap()
            .clock(Frozen(at));
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.timezone.local_minus_utc(), 7200);
        assert_eq!(config.now(), at);
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_timezone("-05:30").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_timezone("+0100").unwrap().local_minus_utc(), 3600);
        assert_eq!(parse_timezone("+9").unwrap().local_minus_utc(), 32400);
        assert!(parse_timezone("Europe/Amsterdam").is_err());
        assert!(parse_timezone("+25:00").is_err());
        assert!(parse_timezone("+01:75").is_err());
        assert!(parse_timezone("+1é1").is_err());
        assert!(parse_timezone("+-5").is_err());
        assert!(parse_timezone("+05:-3").is_err());
        assert!(parse_timezone("+").is_err());
    }
}
