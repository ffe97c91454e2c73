//! Timestamp scalars: seconds, microseconds, and 500 ms block slots.
//!
//! All three types share the same ISO-8601 text form without a timezone
//! designator, `YYYY-MM-DDTHH:MM:SS[.fff]`. [`TimePointSec`] always renders
//! a `.000` suffix; [`TimePoint`] and [`BlockTimestamp`] always render
//! three fractional digits of milliseconds. On input the fraction is
//! optional and read to millisecond granularity: digits past the third are
//! truncated.

use chrono::{DateTime, NaiveDateTime};

use crate::error::ErrorKind;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn bad_time(s: &str) -> ErrorKind {
    ErrorKind::Parse(format!("expected time, got \"{}\"", s))
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime, ErrorKind> {
    NaiveDateTime::parse_from_str(s, FORMAT).map_err(|_| bad_time(s))
}

fn format_seconds(secs: u32) -> String {
    let dt = DateTime::from_timestamp(i64::from(secs), 0).unwrap();
    dt.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Unsigned seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePointSec(pub u32);

impl TimePointSec {
    /// Parses an ISO-8601 timestamp; any fractional seconds are dropped.
    pub fn parse(s: &str) -> Result<Self, ErrorKind> {
        let dt = parse_datetime(s)?;
        let secs = dt.and_utc().timestamp();
        u32::try_from(secs)
            .map(TimePointSec)
            .map_err(|_| ErrorKind::OutOfRange("time is out of range".to_owned()))
    }
}

impl std::fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.000", format_seconds(self.0))
    }
}

/// Unsigned microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint(pub u64);

impl TimePoint {
    /// Parses an ISO-8601 timestamp with up to three fractional digits of
    /// milliseconds honored.
    pub fn parse(s: &str) -> Result<Self, ErrorKind> {
        let dt = parse_datetime(s)?;
        let secs = dt.and_utc().timestamp();
        let secs =
            u64::try_from(secs).map_err(|_| ErrorKind::OutOfRange("time is out of range".to_owned()))?;
        let millis = u64::from(dt.and_utc().timestamp_subsec_millis());
        Ok(TimePoint(secs * 1_000_000 + millis * 1_000))
    }

    /// Milliseconds since the Unix epoch, truncating sub-millisecond detail.
    pub fn as_millis(self) -> u64 {
        self.0 / 1_000
    }
}

impl std::fmt::Display for TimePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = (self.0 / 1_000_000) as i64;
        let millis = (self.0 % 1_000_000) / 1_000;
        match DateTime::from_timestamp(secs, 0) {
            Some(dt) => write!(
                f,
                "{}.{:03}",
                dt.naive_utc().format("%Y-%m-%dT%H:%M:%S"),
                millis
            ),
            // past the supported calendar range
            None => write!(f, "{} microseconds", self.0),
        }
    }
}

/// A block production slot: 500 ms intervals counted from the millisecond
/// epoch 946 684 800 000 (midnight, January 1st 2000 UTC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockTimestamp(pub u32);

impl BlockTimestamp {
    pub const EPOCH_MS: u64 = 946_684_800_000;
    pub const INTERVAL_MS: u64 = 500;

    /// Shares [`TimePoint`]'s text form; times before the slot epoch are
    /// out of range.
    pub fn parse(s: &str) -> Result<Self, ErrorKind> {
        let tp = TimePoint::parse(s)?;
        let since_epoch = tp
            .as_millis()
            .checked_sub(Self::EPOCH_MS)
            .ok_or_else(|| ErrorKind::OutOfRange("time is out of range".to_owned()))?;
        Ok(BlockTimestamp((since_epoch / Self::INTERVAL_MS) as u32))
    }

    pub fn as_time_point(self) -> TimePoint {
        TimePoint((u64::from(self.0) * Self::INTERVAL_MS + Self::EPOCH_MS) * 1_000)
    }
}

impl std::fmt::Display for BlockTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_time_point().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_round_trip() {
        let t = TimePointSec::parse("2018-06-15T19:17:47").unwrap();
        assert_eq!(t.0, 1_529_090_267);
        assert_eq!(t.to_string(), "2018-06-15T19:17:47.000");
        // fraction accepted, then dropped
        assert_eq!(TimePointSec::parse("2018-06-15T19:17:47.999").unwrap(), t);
    }

    #[test]
    fn micros_honor_milliseconds() {
        let t = TimePoint::parse("2018-06-15T19:17:47.500").unwrap();
        assert_eq!(t.0, 1_529_090_267_500_000);
        assert_eq!(t.to_string(), "2018-06-15T19:17:47.500");

        let bare = TimePoint::parse("2018-06-15T19:17:47").unwrap();
        assert_eq!(bare.0, 1_529_090_267_000_000);
        assert_eq!(bare.to_string(), "2018-06-15T19:17:47.000");
    }

    #[test]
    fn long_fractions_truncate_to_millis() {
        let t = TimePoint::parse("2018-06-15T19:17:47.1239").unwrap();
        assert_eq!(t.to_string(), "2018-06-15T19:17:47.123");
    }

    #[test]
    fn slot_conversion() {
        let b = BlockTimestamp::parse("2020-01-01T00:00:00.000").unwrap();
        assert_eq!(b.0, 1_262_304_000);
        assert_eq!(b.to_string(), "2020-01-01T00:00:00.000");

        let half = BlockTimestamp::parse("2000-01-01T00:00:00.500").unwrap();
        assert_eq!(half.0, 1);
    }

    #[test]
    fn pre_epoch_slot_is_rejected() {
        assert!(BlockTimestamp::parse("1999-12-31T23:59:59.500").is_err());
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert!(TimePointSec::parse("not a time").is_err());
        assert!(TimePointSec::parse("1969-12-31T23:59:59").is_err());
    }
}
