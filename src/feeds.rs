use crate::stations::{Station, StationRow};
use crate::trips::RawTrip;

/// Rows read from a trip feed.
#[derive(Debug, Default)]
pub struct TripFeed {
    pub rows: Vec<RawTrip>,
    /// Rows skipped because they did not match the expected columns.
    pub malformed: usize,
}

/// Parses a station feed document.
///
/// Accepts the wrapped `{"data": {"stations": [...]}}` form or a bare array.
/// Descriptors that are not objects or carry no usable id are skipped with a
/// warning; the rest of the feed still loads.
///
/// # Errors
/// * If the text is not JSON or has neither document shape.
pub fn parse_stations(json: &str) -> anyhow::Result<Vec<Station>> {
    let document: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| anyhow::anyhow!("Failed to parse station feed: {}", e))?;
    let entries = match document {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Object(mut root) => match root.get_mut("data").and_then(|d| d.get_mut("stations")) {
            Some(serde_json::Value::Array(entries)) => std::mem::take(entries),
            _ => anyhow::bail!("Station feed has no data.stations array"),
        },
        _ => anyhow::bail!("Station feed must be an array or an object with data.stations"),
    };

    let mut stations = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<StationRow>(entry).map(StationRow::into_station) {
            Ok(Some(station)) => stations.push(station),
            Ok(None) => {
                tracing::debug!("station #{} has no short_name, id or Number", position);
                skipped += 1;
            }
            Err(e) => {
                tracing::debug!("station #{} is malformed: {}", position, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("{} station descriptor(s) skipped", skipped);
    }
    let unplaced = stations.iter().filter(|s| s.position().is_none()).count();
    if unplaced > 0 {
        tracing::warn!("{} station(s) have invalid coordinates", unplaced);
    }
    anyhow::Ok(stations)
}

/// Loads the station feed from a JSON file.
pub fn load_stations<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Vec<Station>> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to read station feed {}: {}", path.as_ref().display(), e))?;
    let stations = parse_stations(&text)?;
    tracing::info!("Loaded {} stations", stations.len());
    anyhow::Ok(stations)
}

/// Reads trip rows from CSV.
///
/// Rows that fail to deserialize are skipped and counted; an I/O failure
/// aborts the whole read.
///
/// # Arguments
/// * `reader` - CSV source with a header row.
/// * `progress` - Ticked once per row.
///
/// # Returns
/// * `anyhow::Result<TripFeed>` - All well-formed rows in feed order.
pub fn read_trips<R: std::io::Read>(reader: R, progress: &indicatif::ProgressBar) -> anyhow::Result<TripFeed> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut feed = TripFeed::default();

    for result in csv_reader.deserialize::<RawTrip>() {
        progress.inc(1);
        match result {
            Ok(row) => feed.rows.push(row),
            Err(e) if e.is_io_error() => return Err(anyhow::anyhow!("Failed to read trip feed: {}", e)),
            Err(e) => {
                tracing::debug!("skipping malformed trip row: {}", e);
                feed.malformed += 1;
            }
        }
    }

    if feed.malformed > 0 {
        tracing::warn!("{} malformed trip row(s) skipped", feed.malformed);
    }
    anyhow::Ok(feed)
}

/// Loads the trip feed from a CSV file.
pub fn load_trips<P: AsRef<std::path::Path>>(path: P, progress: &indicatif::ProgressBar) -> anyhow::Result<TripFeed> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to open trip feed {}: {}", path.as_ref().display(), e))?;
    let feed = read_trips(std::io::BufReader::new(file), progress)?;
    tracing::info!("Read {} trip rows", feed.rows.len());
    anyhow::Ok(feed)
}

/// A spinner for feed loading, hidden when `visible` is false.
pub fn progress_spinner(visible: bool, message: &'static str) -> indicatif::ProgressBar {
    if !visible {
        return indicatif::ProgressBar::hidden();
    }
    let bar = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.green} {msg} {pos} rows [{elapsed_precise}]") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(120));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_station_document() {
        let json = r#"{"last_updated": 1, "data": {"stations": [
            {"short_name": "A32000", "lon": -71.04, "lat": 42.35, "capacity": 19},
            {"short_name": "B32000", "lon": "bad", "lat": 42.36}
        ]}}"#;
        let stations = parse_stations(json).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id, "A32000");
        assert!(stations[1].position().is_none());
    }

    #[test]
    fn test_bare_station_array() {
        let stations = parse_stations(r#"[{"short_name": "A32000"}]"#).unwrap();
        assert_eq!(stations, vec![Station::new("A32000")]);
    }

    #[test]
    fn test_station_document_errors() {
        assert!(parse_stations("not json").is_err());
        assert!(parse_stations(r#"{"data": {}}"#).is_err());
        assert!(parse_stations(r#""stations""#).is_err());
    }

    #[test]
    fn test_number_only_feed() {
        let stations = parse_stations(r#"[{"Number": "A32000", "lon": -71.0, "lat": 42.0}]"#).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "A32000");
        assert_eq!(stations[0].position(), Some((-71.0, 42.0)));
    }

    #[test]
    fn test_short_name_and_id_together() {
        let stations = parse_stations(r#"[{"short_name": "A32000", "id": "A32000"}]"#).unwrap();
        assert_eq!(stations, vec![Station::new("A32000")]);
    }

    #[test]
    fn test_bad_descriptor_does_not_sink_the_feed() {
        let json = r#"{"data": {"stations": [
            {"short_name": "A32000", "lon": -71.04, "lat": 42.35},
            {"name": "no id at all"},
            "not an object",
            {"short_name": ["A", "B"]},
            {"Number": "C32000"}
        ]}}"#;
        let stations = parse_stations(json).unwrap();
        let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A32000", "C32000"]);
    }

    #[test]
    fn test_read_trips_skips_malformed_rows() {
        let csv = "\
ride_id,rideable_type,started_at,ended_at,start_station_id,end_station_id,is_member
r1,classic,2024-03-01 08:00:00.000,2024-03-01 08:12:00.000,A32000,B32000,1
r2,classic,2024-03-01 09:00:00.000
r3,electric,bogus,2024-03-01 10:05:00,B32000,A32000,0
";
        let feed = read_trips(csv.as_bytes(), &indicatif::ProgressBar::hidden()).unwrap();
        assert_eq!(feed.malformed, 1);
        assert_eq!(feed.rows.len(), 2);
        assert_eq!(feed.rows[0].start_station_id, "A32000");
        // timestamp problems are left for ingestion
        assert_eq!(feed.rows[1].started_at, "bogus");
    }

    #[test]
    fn test_read_trips_missing_column_drops_every_row() {
        let csv = "started_at,ended_at,start_station_id\n2024-03-01 08:00,2024-03-01 08:10,A\n";
        let feed = read_trips(csv.as_bytes(), &indicatif::ProgressBar::hidden()).unwrap();
        assert!(feed.rows.is_empty());
        assert_eq!(feed.malformed, 1);
    }
}
