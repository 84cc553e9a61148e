//! Time axis handling.
//!
//! NetCDF files store time as numeric offsets from an epoch described by a CF
//! `units` attribute (`"days since 1800-1-1 00:00:00"`). The tabular files
//! carry the decoded timestamps as text, and both downstream stages derive the
//! year from the parsed timestamp so they always agree.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;
use thiserror::Error;

/// Format used for the `time` column of the tabular files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("time units '{0}' are not of the form '<unit> since <epoch>'")]
    MalformedUnits(String),
    #[error("unsupported time unit '{0}'")]
    UnsupportedUnit(String),
    #[error("invalid epoch '{0}'")]
    InvalidEpoch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn seconds(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3_600.0,
            TimeUnit::Days => 86_400.0,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        };
        write!(f, "{}", name)
    }
}

/// Parsed CF time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub epoch: NaiveDateTime,
}

impl TimeUnits {
    pub fn parse(units: &str) -> Result<Self, TimeError> {
        let (unit, epoch) = units
            .trim()
            .split_once(" since ")
            .ok_or_else(|| TimeError::MalformedUnits(units.to_string()))?;

        let unit = match unit.trim().to_ascii_lowercase().as_str() {
            "second" | "seconds" | "s" | "sec" | "secs" => TimeUnit::Seconds,
            "minute" | "minutes" | "min" | "mins" => TimeUnit::Minutes,
            "hour" | "hours" | "h" | "hr" | "hrs" => TimeUnit::Hours,
            "day" | "days" | "d" => TimeUnit::Days,
            other => return Err(TimeError::UnsupportedUnit(other.to_string())),
        };

        // Some files append a timezone ("... 00:00:00 UTC" or "Z"), drop it.
        let epoch_str = epoch
            .trim()
            .trim_end_matches("UTC")
            .trim_end_matches('Z')
            .trim();
        let epoch = parse_timestamp(epoch_str)
            .ok_or_else(|| TimeError::InvalidEpoch(epoch.trim().to_string()))?;

        Ok(Self { unit, epoch })
    }

    /// Converts a numeric offset into a timestamp, `None` when the result is not
    /// representable.
    pub fn decode(&self, offset: f64) -> Option<NaiveDateTime> {
        if !offset.is_finite() {
            return None;
        }
        let millis = (offset * self.unit.seconds() * 1_000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(millis as i64)?;
        self.epoch.checked_add_signed(delta)
    }
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} since {}", self.unit, self.epoch.format(TIMESTAMP_FORMAT))
    }
}

/// Parses the timestamp layouts found in CF epochs and in spreadsheet cells.
/// Date-only strings resolve to midnight. Single digit months and days are
/// accepted.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn format_timestamp(time: &NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}
