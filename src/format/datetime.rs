//! OFX date-time encoding: `YYYYMMDD[HHMMSS][.XXX][[offset:TZ]]`

use crate::types::{InvalidFieldError, OfxDateTime, UtcOffset};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Format a date-time
///
/// Seconds are always written when a time is present, milliseconds only
/// when non-zero, and the bracketed zone suffix only when an explicit
/// offset was supplied.
///
/// # Errors
///
/// Fails when the year cannot be written with four digits.
pub fn format_datetime(value: &OfxDateTime) -> Result<String, InvalidFieldError> {
    let date = value.date();
    if !(0..=9999).contains(&date.year()) {
        return Err(InvalidFieldError::new(
            "date",
            value.naive_local().to_string(),
            "year must be between 0000 and 9999",
        ));
    }

    let mut encoded = format!("{:04}{:02}{:02}", date.year(), date.month(), date.day());

    if let Some(time) = value.time() {
        encoded.push_str(&format!(
            "{:02}{:02}{:02}",
            time.hour(),
            time.minute(),
            time.second()
        ));
        let millis = (time.nanosecond() % 1_000_000_000) / 1_000_000;
        if millis > 0 {
            encoded.push_str(&format!(".{:03}", millis));
        }
    }

    if let Some(offset) = value.offset() {
        encoded.push_str(&format_offset(offset));
    }

    Ok(encoded)
}

/// Format an offset as `[hours:NAME]` with decimal hours
fn format_offset(offset: &UtcOffset) -> String {
    let minutes = offset.minutes();
    let sign = if minutes < 0 { "-" } else { "" };
    let hours = minutes.abs() / 60;
    let hours = match minutes.abs() % 60 {
        0 => format!("{}{}", sign, hours),
        15 => format!("{}{}.25", sign, hours),
        30 => format!("{}{}.5", sign, hours),
        45 => format!("{}{}.75", sign, hours),
        rest => format!("{}{}.{:02}", sign, hours, rest * 100 / 60),
    };

    match offset.name() {
        Some(name) => format!("[{}:{}]", hours, name),
        None => format!("[{}]", hours),
    }
}

/// Parse a date-time element value
pub fn parse_datetime(field: &str, raw: &str) -> Result<OfxDateTime, InvalidFieldError> {
    let raw = raw.trim();
    let invalid = |reason: &str| InvalidFieldError::new(field, raw, reason);

    let (main, zone) = match raw.find('[') {
        Some(index) => {
            let zone = raw[index + 1..]
                .strip_suffix(']')
                .ok_or_else(|| invalid("unterminated time zone suffix"))?;
            (&raw[..index], Some(zone))
        }
        None => (raw, None),
    };

    let (digits, fraction) = match main.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (main, None),
    };

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("expected digits in YYYYMMDD[HHMMSS] form"));
    }

    let number = |range: std::ops::Range<usize>| -> u32 {
        digits[range].parse().unwrap_or(u32::MAX)
    };

    let date = match digits.len() {
        8 | 14 => NaiveDate::from_ymd_opt(number(0..4) as i32, number(4..6), number(6..8))
            .ok_or_else(|| invalid("not a valid calendar date"))?,
        _ => return Err(invalid("expected YYYYMMDD or YYYYMMDDHHMMSS")),
    };

    let mut value = if digits.len() == 14 {
        let millis = match fraction {
            Some(f) if f.len() == 3 && f.chars().all(|c| c.is_ascii_digit()) => {
                f.parse().unwrap_or(0)
            }
            Some(_) => return Err(invalid("fractional seconds must be three digits")),
            None => 0,
        };
        let time = NaiveTime::from_hms_milli_opt(
            number(8..10),
            number(10..12),
            number(12..14),
            millis,
        )
        .ok_or_else(|| invalid("not a valid time of day"))?;
        OfxDateTime::from_naive(date.and_time(time))
    } else {
        if fraction.is_some() {
            return Err(invalid("fractional seconds require a time of day"));
        }
        OfxDateTime::from_date(date)
    };

    if let Some(zone) = zone {
        let offset = parse_offset(zone)
            .map_err(|e| InvalidFieldError::new(field, raw, e.reason))?;
        value = value.with_offset(offset);
    }

    Ok(value)
}

/// Parse the inside of a `[offset:NAME]` suffix
fn parse_offset(zone: &str) -> Result<UtcOffset, InvalidFieldError> {
    let (hours, name) = match zone.split_once(':') {
        Some((hours, name)) => (hours, Some(name)),
        None => (zone, None),
    };

    let unsigned = hours
        .strip_prefix('-')
        .or_else(|| hours.strip_prefix('+'))
        .unwrap_or(hours);
    let well_formed = !unsigned.is_empty()
        && unsigned.chars().filter(|c| *c == '.').count() <= 1
        && unsigned.chars().all(|c| c.is_ascii_digit() || c == '.')
        && unsigned.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(InvalidFieldError::new(
            "UTC offset",
            zone,
            "expected decimal hours such as -5 or 5.5",
        ));
    }

    let minutes = Decimal::from_str(hours.strip_prefix('+').unwrap_or(hours))
        .ok()
        .and_then(|h| h.checked_mul(Decimal::from(60)))
        .filter(|m| m.fract().is_zero())
        .and_then(|m| m.to_i32())
        .ok_or_else(|| {
            InvalidFieldError::new("UTC offset", zone, "offset must be a whole number of minutes")
        })?;

    UtcOffset::new(minutes, name)
}
