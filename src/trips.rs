use crate::error::TrafficError;
use crate::time::{self, MinuteOfDay};

/// One row of the trip feed, as read from CSV.
///
/// Timestamps stay as text here so that a single bad value drops only its
/// own row. Columns not named below are ignored.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RawTrip {
    pub start_station_id: String,
    pub end_station_id: String,
    pub started_at: String,
    pub ended_at: String,
}

/// A trip after ingestion. Immutable; the minute fields are derived once.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TripRecord {
    pub start_station_id: String,
    pub end_station_id: String,
    pub started_at: chrono::NaiveDateTime,
    pub ended_at: chrono::NaiveDateTime,
    pub start_minute: MinuteOfDay,
    pub end_minute: MinuteOfDay,
}

impl TripRecord {
    pub fn new(
        start_station_id: impl Into<String>,
        end_station_id: impl Into<String>,
        started_at: chrono::NaiveDateTime,
        ended_at: chrono::NaiveDateTime,
    ) -> Self {
        Self {
            start_station_id: start_station_id.into(),
            end_station_id: end_station_id.into(),
            start_minute: MinuteOfDay::of(&started_at),
            end_minute: MinuteOfDay::of(&ended_at),
            started_at,
            ended_at,
        }
    }
}

impl TryFrom<RawTrip> for TripRecord {
    type Error = TrafficError;

    fn try_from(raw: RawTrip) -> Result<Self, Self::Error> {
        let started_at = time::parse_timestamp(&raw.started_at)?;
        let ended_at = time::parse_timestamp(&raw.ended_at)?;
        Ok(TripRecord::new(raw.start_station_id, raw.end_station_id, started_at, ended_at))
    }
}
