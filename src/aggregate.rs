use std::collections::HashMap;

use crate::stations::Station;
use crate::trips::TripRecord;

/// Trip counts keyed by station id. Stations with no trips are absent.
pub type StationCounts = HashMap<String, u32>;

/// Departure and arrival counts for one trip selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficCounts {
    pub departures: StationCounts,
    pub arrivals: StationCounts,
}

impl TrafficCounts {
    /// Counts departures from one selection and arrivals from another, as
    /// used when the two come from separate bucket arrays.
    pub fn from_selections(departing: &[&TripRecord], arriving: &[&TripRecord]) -> Self {
        Self {
            departures: count_by(departing, |t| &t.start_station_id),
            arrivals: count_by(arriving, |t| &t.end_station_id),
        }
    }

    /// Station ids that were counted but are not in `stations`.
    pub fn unmatched<'a>(&'a self, stations: &[Station]) -> Vec<&'a str> {
        let known: std::collections::HashSet<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        let mut ids: Vec<&str> = self
            .departures
            .keys()
            .chain(self.arrivals.keys())
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Per-station traffic for one filter state. Built fresh on every recompute.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StationTraffic {
    pub station_id: String,
    pub departures: u32,
    pub arrivals: u32,
    pub total_traffic: u32,
}

impl StationTraffic {
    pub fn new(station_id: impl Into<String>, departures: u32, arrivals: u32) -> Self {
        Self {
            station_id: station_id.into(),
            departures,
            arrivals,
            total_traffic: departures + arrivals,
        }
    }
}

/// Groups a trip subset by start and end station and counts each group.
///
/// Ids are not checked against the station list here.
pub fn aggregate(trips: &[&TripRecord]) -> TrafficCounts {
    TrafficCounts::from_selections(trips, trips)
}

fn count_by<F>(trips: &[&TripRecord], key: F) -> StationCounts
where
    F: Fn(&TripRecord) -> &String,
{
    let mut counts = StationCounts::new();
    for trip in trips {
        *counts.entry(key(trip).clone()).or_insert(0) += 1;
    }
    counts
}

/// Joins counts onto the station list, one record per station in list order.
///
/// Missing counts default to zero. Inputs are left untouched.
pub fn merge(stations: &[Station], departures: &StationCounts, arrivals: &StationCounts) -> Vec<StationTraffic> {
    stations
        .iter()
        .map(|station| {
            StationTraffic::new(
                station.id.clone(),
                departures.get(&station.id).copied().unwrap_or(0),
                arrivals.get(&station.id).copied().unwrap_or(0),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(from: &str, to: &str) -> TripRecord {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        TripRecord::new(from, to, dt, dt)
    }

    #[test]
    fn test_aggregate_groups_by_start_and_end() {
        let trips = vec![trip("X", "Y"), trip("X", "Z"), trip("Y", "X")];
        let refs: Vec<&TripRecord> = trips.iter().collect();
        let counts = aggregate(&refs);

        assert_eq!(counts.departures.get("X"), Some(&2));
        assert_eq!(counts.departures.get("Y"), Some(&1));
        assert_eq!(counts.departures.get("Z"), None);
        assert_eq!(counts.arrivals.get("X"), Some(&1));
        assert_eq!(counts.arrivals.get("Y"), Some(&1));
        assert_eq!(counts.arrivals.get("Z"), Some(&1));
    }

    #[test]
    fn test_aggregate_empty_subset_has_no_entries() {
        let counts = aggregate(&[]);
        assert!(counts.departures.is_empty());
        assert!(counts.arrivals.is_empty());
    }

    #[test]
    fn test_dangling_ids_are_counted_but_not_merged() {
        let trips = vec![trip("X", "GHOST")];
        let refs: Vec<&TripRecord> = trips.iter().collect();
        let counts = aggregate(&refs);
        assert_eq!(counts.arrivals.get("GHOST"), Some(&1));

        let stations = vec![Station::new("X")];
        let merged = merge(&stations, &counts.departures, &counts.arrivals);
        assert_eq!(merged, vec![StationTraffic::new("X", 1, 0)]);
        assert_eq!(counts.unmatched(&stations), vec!["GHOST"]);
    }

    #[test]
    fn test_merge_defaults_and_keeps_station_order() {
        let stations = vec![Station::new("C"), Station::new("A"), Station::new("B")];
        let departures = StationCounts::from([("A".to_string(), 3)]);
        let arrivals = StationCounts::from([("A".to_string(), 2), ("B".to_string(), 5)]);

        let merged = merge(&stations, &departures, &arrivals);

        let ids: Vec<&str> = merged.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        assert_eq!(merged[0], StationTraffic::new("C", 0, 0));
        assert_eq!(merged[0].total_traffic, 0);
        assert_eq!(merged[1].total_traffic, 5);
        assert_eq!(merged[2].total_traffic, 5);
        for s in &merged {
            assert_eq!(s.total_traffic, s.departures + s.arrivals);
        }
        // inputs untouched
        assert_eq!(departures.len(), 1);
        assert_eq!(arrivals.len(), 2);
    }
}
