/// Typed failures raised by the traffic engine.
///
/// Loading and application code wraps these in `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum TrafficError {
    #[error("minute of day out of range: {0} (expected -1 or 0..=1439)")]
    InvalidMinute(i64),

    #[error("cannot read time filter from '{0}' (expected -1, 'any', a minute or HH:MM)")]
    InvalidTimeFilter(String),

    #[error("unparseable timestamp '{value}'")]
    Timestamp { value: String },

    #[error("trip cache format version {found} does not match expected {expected}")]
    CacheVersion { found: u32, expected: u32 },
}
