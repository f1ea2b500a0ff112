//! Date windows resolved against a named timezone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{Result, ScrapeError};

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Europe/Kiev";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Inclusive range of post timestamps to retain.
///
/// `end` of `None` means "up to the newest post".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeWindow {
    pub start: DateTime<FixedOffset>,
    pub end: Option<DateTime<FixedOffset>>,
}

impl ScrapeWindow {
    /// Build a window from already resolved timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidWindow`] if `end` precedes `start`.
    pub fn new(
        start: DateTime<FixedOffset>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Result<Self> {
        if let Some(end) = end {
            if end < start {
                return Err(ScrapeError::InvalidWindow { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Parse local date strings and resolve them in the named timezone.
    ///
    /// Accepts `YYYY-MM-DD` with an optional `HH:MM[:SS]` time of day,
    /// separated by a space or `T`. A bare date means midnight.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is unknown, a date cannot be parsed or
    /// does not exist locally, or the range is inverted.
    pub fn parse(start: &str, end: Option<&str>, timezone: &str) -> Result<Self> {
        let tz = parse_timezone(timezone)?;
        let start = localize(parse_naive(start)?, tz, start)?;
        let end = end
            .map(|value| localize(parse_naive(value)?, tz, value))
            .transpose()?;
        Self::new(start, end)
    }

    /// Whether `date` lies within the window, both bounds inclusive.
    #[must_use]
    pub fn contains(&self, date: &DateTime<FixedOffset>) -> bool {
        *date >= self.start && self.end.map_or(true, |end| *date <= end)
    }
}

/// Look up an IANA timezone name.
///
/// # Errors
///
/// Returns [`ScrapeError::UnknownTimezone`] for names `chrono-tz` does not know.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ScrapeError::UnknownTimezone(name.to_string()))
}

fn parse_naive(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| ScrapeError::InvalidDate {
            value: value.to_string(),
        })
}

fn localize(naive: NaiveDateTime, tz: Tz, raw: &str) -> Result<DateTime<FixedOffset>> {
    // Ambiguous local times (DST fall-back) resolve to the earlier instant.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| ScrapeError::InvalidDate {
            value: raw.to_string(),
        })
}
