use chrono::Timelike;

use crate::error::TrafficError;

pub const MINUTES_PER_DAY: usize = 1440;

/// Slider value meaning "no time restriction".
pub const ANY_TIME_SENTINEL: i64 = -1;

/// Timestamp layouts accepted in trip feeds, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A minute of the day in `[0, 1439]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub const MIDNIGHT: MinuteOfDay = MinuteOfDay(0);
    pub const LAST: MinuteOfDay = MinuteOfDay(1439);

    pub fn new(minute: u16) -> Result<Self, TrafficError> {
        if (minute as usize) < MINUTES_PER_DAY {
            Ok(Self(minute))
        } else {
            Err(TrafficError::InvalidMinute(minute as i64))
        }
    }

    /// Hours * 60 + minutes of a time value. The date part, seconds and
    /// sub-second precision are discarded.
    pub fn of<T: Timelike>(time: &T) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u16> for MinuteOfDay {
    type Error = TrafficError;

    fn try_from(minute: u16) -> Result<Self, Self::Error> {
        MinuteOfDay::new(minute)
    }
}

impl From<MinuteOfDay> for u16 {
    fn from(minute: MinuteOfDay) -> u16 {
        minute.0
    }
}

impl std::fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// The time-of-day filter driving every recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TimeFilter {
    AnyTime,
    Minute(MinuteOfDay),
}

impl TimeFilter {
    /// Maps the raw slider value: `-1` is "any time", `0..=1439` a minute.
    pub fn from_slider(value: i64) -> Result<Self, TrafficError> {
        match value {
            ANY_TIME_SENTINEL => Ok(TimeFilter::AnyTime),
            0..=1439 => Ok(TimeFilter::Minute(MinuteOfDay(value as u16))),
            other => Err(TrafficError::InvalidMinute(other)),
        }
    }

    /// Back to the slider representation.
    pub fn slider_value(self) -> i64 {
        match self {
            TimeFilter::AnyTime => ANY_TIME_SENTINEL,
            TimeFilter::Minute(minute) => minute.value() as i64,
        }
    }

    /// Label shown next to the slider.
    pub fn label(self) -> String {
        match self {
            TimeFilter::AnyTime => "(any time)".to_string(),
            TimeFilter::Minute(minute) => format_minute(minute),
        }
    }
}

impl std::str::FromStr for TimeFilter {
    type Err = TrafficError;

    /// Accepts `-1`, `any`, a plain minute number or a 24-hour `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("any") {
            return Ok(TimeFilter::AnyTime);
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return TimeFilter::from_slider(value);
        }
        let time = chrono::NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map_err(|_| TrafficError::InvalidTimeFilter(s.to_string()))?;
        Ok(TimeFilter::Minute(MinuteOfDay::of(&time)))
    }
}

/// Parses a feed timestamp into a naive wall-clock date-time.
///
/// RFC 3339 values keep the wall-clock time as written; the offset is not
/// applied, since only the time of day at the station matters.
///
/// # Errors
/// * `TrafficError::Timestamp` if no accepted layout matches.
pub fn parse_timestamp(value: &str) -> Result<chrono::NaiveDateTime, TrafficError> {
    let trimmed = value.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| TrafficError::Timestamp { value: value.to_string() })
}

/// Formats a minute of the day as a short 12-hour clock label, e.g. `1:05 PM`.
pub fn format_minute(minute: MinuteOfDay) -> String {
    let value = minute.value() as u32;
    // always valid: hour < 24, minute < 60
    match chrono::NaiveTime::from_hms_opt(value / 60, value % 60, 0) {
        Some(time) => time.format("%-I:%M %p").to_string(),
        None => minute.to_string(),
    }
}
