//! OFX date-time values
//!
//! OFX dates carry variable precision: a bare date, a date with a time of
//! day (seconds, optionally milliseconds), and optionally an explicit UTC
//! offset with a time-zone label. No local time zone is ever assumed; a
//! value without an offset stays without one all the way to the output.

use super::error::InvalidFieldError;
use crate::format::datetime::format_datetime;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::cmp::Ordering;
use std::fmt;

/// Largest offset accepted, in minutes (UTC+14:00)
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Smallest offset accepted, in minutes (UTC-12:00)
const MIN_OFFSET_MINUTES: i32 = -12 * 60;

/// Maximum length of a time-zone label
const MAX_ZONE_NAME_LEN: usize = 10;

/// Explicit UTC offset attached to an OFX date-time
///
/// Offsets are whole quarter hours so they can be written as decimal hours
/// (`-5`, `5.5`, `5.75`) without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UtcOffset {
    minutes: i32,
    name: Option<String>,
}

impl UtcOffset {
    /// Create an offset from minutes east of UTC and an optional zone label
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is outside -12:00..=+14:00, is not a
    /// multiple of 15 minutes, or the label is not 1-10 ASCII alphanumerics.
    pub fn new(minutes: i32, name: Option<&str>) -> Result<Self, InvalidFieldError> {
        if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(InvalidFieldError::new(
                "UTC offset",
                minutes.to_string(),
                "offset must be between -12:00 and +14:00",
            ));
        }
        if minutes % 15 != 0 {
            return Err(InvalidFieldError::new(
                "UTC offset",
                minutes.to_string(),
                "offset must be a whole number of quarter hours",
            ));
        }
        if let Some(label) = name {
            if label.is_empty()
                || label.len() > MAX_ZONE_NAME_LEN
                || !label.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(InvalidFieldError::new(
                    "time zone name",
                    label,
                    "must be 1-10 ASCII letters or digits",
                ));
            }
        }

        Ok(UtcOffset {
            minutes,
            name: name.map(str::to_string),
        })
    }

    /// Create a whole-hour offset
    pub fn hours(hours: i32, name: Option<&str>) -> Result<Self, InvalidFieldError> {
        Self::new(hours.saturating_mul(60), name)
    }

    /// UTC, labelled `GMT` as most OFX producers do
    pub fn utc() -> Self {
        UtcOffset {
            minutes: 0,
            name: Some("GMT".to_string()),
        }
    }

    /// Minutes east of UTC
    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    /// Time-zone label, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// OFX date-time: a date, an optional time of day, an optional UTC offset
///
/// Times are kept at millisecond precision; anything finer is truncated on
/// construction so that a value always survives a format/parse round trip.
/// A leap second has no OFX encoding and is held at `hh:mm:59.999`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OfxDateTime {
    date: NaiveDate,
    time: Option<NaiveTime>,
    offset: Option<UtcOffset>,
}

impl OfxDateTime {
    /// Date-only value (`YYYYMMDD`)
    pub fn from_date(date: NaiveDate) -> Self {
        OfxDateTime {
            date,
            time: None,
            offset: None,
        }
    }

    /// Date and time of day without an offset
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        OfxDateTime {
            date: datetime.date(),
            time: Some(truncate_to_millis(datetime.time())),
            offset: None,
        }
    }

    /// Date and time with the offset taken from a chrono `DateTime`
    ///
    /// The offset is written without a zone label.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is not representable (see [`UtcOffset::new`]).
    pub fn from_fixed(datetime: DateTime<FixedOffset>) -> Result<Self, InvalidFieldError> {
        let offset_seconds = datetime.offset().local_minus_utc();
        if offset_seconds % 60 != 0 {
            return Err(InvalidFieldError::new(
                "UTC offset",
                offset_seconds.to_string(),
                "offset must be a whole number of minutes",
            ));
        }
        let offset = UtcOffset::new(offset_seconds / 60, None)?;
        Ok(Self::from_naive(datetime.naive_local()).with_offset(offset))
    }

    /// Attach an explicit UTC offset
    pub fn with_offset(self, offset: UtcOffset) -> Self {
        OfxDateTime {
            offset: Some(offset),
            ..self
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn offset(&self) -> Option<&UtcOffset> {
        self.offset.as_ref()
    }

    /// Wall-clock value, midnight when no time is present
    pub fn naive_local(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }

    /// Chronological comparison across precisions
    ///
    /// When either value is date-only only the dates are compared. When both
    /// carry a time and an offset the UTC instants are compared; otherwise
    /// the wall-clock values are.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.time, other.time) {
            (Some(_), Some(_)) => match (&self.offset, &other.offset) {
                (Some(a), Some(b)) => utc_naive(self.naive_local(), a)
                    .cmp(&utc_naive(other.naive_local(), b)),
                _ => self.naive_local().cmp(&other.naive_local()),
            },
            _ => self.date.cmp(&other.date),
        }
    }
}

impl fmt::Display for OfxDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_datetime(self) {
            Ok(encoded) => f.write_str(&encoded),
            Err(_) => write!(f, "{}", self.naive_local()),
        }
    }
}

fn truncate_to_millis(time: NaiveTime) -> NaiveTime {
    let millis = time.nanosecond().min(999_999_999) / 1_000_000;
    time.with_nanosecond(millis * 1_000_000).unwrap_or(time)
}

fn utc_naive(local: NaiveDateTime, offset: &UtcOffset) -> NaiveDateTime {
    local - Duration::minutes(i64::from(offset.minutes()))
}
