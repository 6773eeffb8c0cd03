/// A dock location from the station feed.
///
/// Coordinates that are missing or not numeric decode to `None`; the station
/// still takes part in every aggregation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Station {
    #[serde(rename = "short_name")]
    pub id: String,
    pub name: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

impl Station {
    /// Creates a station with no name and no coordinates.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), name: None, lon: None, lat: None }
    }

    /// `(lon, lat)` when both coordinates are usable.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => Some((lon, lat)),
            _ => None,
        }
    }
}

/// One station descriptor as it appears in a feed.
///
/// GBFS-style feeds carry `short_name`; older Bluebikes exports carry
/// `Number` and may carry both. Each id column is read on its own so a
/// document with several of them still decodes.
#[derive(Debug, Default, serde::Deserialize)]
pub struct StationRow {
    #[serde(default, deserialize_with = "lenient_id")]
    pub short_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, rename = "Number", deserialize_with = "lenient_id")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
}

impl StationRow {
    /// The station id: `short_name`, then `id`, then `Number`.
    pub fn station_id(&self) -> Option<&str> {
        self.short_name
            .as_deref()
            .or(self.id.as_deref())
            .or(self.number.as_deref())
    }

    /// Converts the row, or `None` when it has no usable id.
    pub fn into_station(self) -> Option<Station> {
        let id = self.station_id()?.to_string();
        Some(Station {
            id,
            name: self.name,
            lon: self.lon,
            lat: self.lat,
        })
    }
}

/// Accepts a JSON string or number; blank strings and anything else become `None`.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_json::Value> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Accepts a JSON number or a numeric string; anything else becomes `None`.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_json::Value> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.and_then(|v| coordinate_from_value(&v)))
}

fn coordinate_from_value(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Vec<Option<Station>> {
        let rows: Vec<StationRow> = serde_json::from_str(json).unwrap();
        rows.into_iter().map(StationRow::into_station).collect()
    }

    #[test]
    fn test_decode_numeric_and_string_coordinates() {
        let stations = decode(
            r#"[
            {"short_name": "A32000", "name": "Fan Pier", "lon": -71.044624, "lat": 42.353391},
            {"short_name": "B32012", "lon": "-71.0997", "lat": "42.3401"}
        ]"#,
        );
        let a = stations[0].as_ref().unwrap();
        assert_eq!(a.position(), Some((-71.044624, 42.353391)));
        assert_eq!(a.name.as_deref(), Some("Fan Pier"));
        assert_eq!(stations[1].as_ref().unwrap().position(), Some((-71.0997, 42.3401)));
    }

    #[test]
    fn test_legacy_columns_alongside_gbfs_fields() {
        let stations = decode(
            r#"[{"Number": "A32000", "NAME": "Fan Pier", "Lat": 42.35, "Long": -71.04,
                 "short_name": "A32000", "name": "Fan Pier", "lat": 42.35, "lon": -71.04}]"#,
        );
        let station = stations[0].as_ref().unwrap();
        assert_eq!(station.id, "A32000");
        assert_eq!(station.position(), Some((-71.04, 42.35)));
    }

    #[test]
    fn test_number_only_row() {
        let stations = decode(r#"[{"Number": "A32000", "lon": -71.0, "lat": 42.0}]"#);
        assert_eq!(stations[0].as_ref().unwrap().id, "A32000");
    }

    #[test]
    fn test_id_precedence() {
        let stations = decode(
            r#"[
            {"short_name": "A32000", "id": "17", "Number": "OLD1"},
            {"id": 17, "Number": "OLD2"},
            {"short_name": "  ", "Number": "OLD3"}
        ]"#,
        );
        let ids: Vec<&str> = stations.iter().map(|s| s.as_ref().unwrap().id.as_str()).collect();
        assert_eq!(ids, vec!["A32000", "17", "OLD3"]);
    }

    #[test]
    fn test_row_without_id_is_rejected() {
        let stations = decode(r#"[{"name": "Mystery dock", "lon": -71.0, "lat": 42.0}, {"short_name": null}]"#);
        assert!(stations.iter().all(Option::is_none));
    }

    #[test]
    fn test_malformed_coordinates_keep_station() {
        let stations = decode(
            r#"[
            {"short_name": "C32000", "lon": "n/a", "lat": 42.1},
            {"short_name": "D32000", "lat": null},
            {"id": "E32000", "lon": "", "lat": true}
        ]"#,
        );
        let stations: Vec<Station> = stations.into_iter().map(Option::unwrap).collect();
        assert_eq!(stations.len(), 3);
        assert!(stations.iter().all(|s| s.position().is_none()));
        assert_eq!(stations[0].lat, Some(42.1));
        assert_eq!(stations[2].id, "E32000");
    }
}
