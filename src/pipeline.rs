use rayon::prelude::*;

use crate::aggregate::{self, StationTraffic, TrafficCounts};
use crate::encode::{FlowLevel, VisualEncoder};
use crate::index::{self, TripIndex};
use crate::stations::Station;
use crate::time::{MinuteOfDay, TimeFilter, MINUTES_PER_DAY};

/// One station's traffic plus its visual encoding.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StationView {
    #[serde(flatten)]
    pub traffic: StationTraffic,
    pub radius: f64,
    pub flow: FlowLevel,
}

/// The output of one recompute: a snapshot per station, in station order.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TrafficFrame {
    pub filter: TimeFilter,
    pub stations: Vec<StationView>,
}

impl TrafficFrame {
    pub fn total_departures(&self) -> u64 {
        self.stations.iter().map(|s| s.traffic.departures as u64).sum()
    }

    pub fn total_arrivals(&self) -> u64 {
        self.stations.iter().map(|s| s.traffic.arrivals as u64).sum()
    }

    /// The station with the most total traffic; ties go to the earlier station.
    pub fn busiest(&self) -> Option<&StationView> {
        self.stations
            .iter()
            .filter(|s| s.traffic.total_traffic > 0)
            .fold(None, |best: Option<&StationView>, s| match best {
                Some(b) if b.traffic.total_traffic >= s.traffic.total_traffic => Some(b),
                _ => Some(s),
            })
    }

    /// Stations sorted by descending total traffic, at most `count`.
    pub fn top(&self, count: usize) -> Vec<&StationView> {
        let mut sorted: Vec<&StationView> = self.stations.iter().collect();
        sorted.sort_by(|a, b| b.traffic.total_traffic.cmp(&a.traffic.total_traffic));
        sorted.truncate(count);
        sorted
    }
}

/// Summary of one sampled minute in a day sweep.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SweepPoint {
    pub minute: MinuteOfDay,
    pub departures: u64,
    pub arrivals: u64,
    pub busiest_station: Option<String>,
    pub busiest_total: u32,
}

/// Runs the window → aggregate → merge → encode pipeline over a fixed index
/// and station list.
///
/// Holds no mutable state; every call to [`TrafficEngine::recompute`]
/// returns a fresh frame.
#[derive(Debug)]
pub struct TrafficEngine {
    index: TripIndex,
    stations: Vec<Station>,
    encoder: VisualEncoder,
}

impl TrafficEngine {
    pub fn new(index: TripIndex, stations: Vec<Station>, encoder: VisualEncoder) -> Self {
        Self { index, stations, encoder }
    }

    pub fn index(&self) -> &TripIndex {
        &self.index
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn encoder(&self) -> &VisualEncoder {
        &self.encoder
    }

    /// Departure and arrival counts for a filter.
    ///
    /// Departures are read from the departure buckets and arrivals from the
    /// arrival buckets, each windowed on its own minute.
    pub fn counts(&self, filter: TimeFilter) -> TrafficCounts {
        let departing = index::select(self.index.departures(), filter);
        let arriving = index::select(self.index.arrivals(), filter);
        let counts = TrafficCounts::from_selections(&departing, &arriving);

        if tracing::enabled!(tracing::Level::DEBUG) {
            let unmatched = counts.unmatched(&self.stations);
            if !unmatched.is_empty() {
                tracing::debug!("{} counted station id(s) not in station list", unmatched.len());
            }
        }
        counts
    }

    /// Per-station traffic only, without encoding.
    pub fn station_traffic(&self, filter: TimeFilter) -> Vec<StationTraffic> {
        let counts = self.counts(filter);
        aggregate::merge(&self.stations, &counts.departures, &counts.arrivals)
    }

    /// Full recompute for one filter state.
    pub fn recompute(&self, filter: TimeFilter) -> TrafficFrame {
        let traffic = self.station_traffic(filter);
        let scale = self.encoder.radius_scale(&traffic);

        let stations = traffic
            .into_iter()
            .map(|t| StationView {
                radius: self.encoder.radius(&scale, &t),
                flow: self.encoder.flow(&t),
                traffic: t,
            })
            .collect();

        TrafficFrame { filter, stations }
    }

    /// Recomputes every `step` minutes across the day, in parallel.
    ///
    /// # Arguments
    /// * `step` - Minutes between samples. Zero is treated as one.
    ///
    /// # Returns
    /// * `Vec<SweepPoint>` - One point per sampled minute, in minute order.
    pub fn sweep(&self, step: usize) -> Vec<SweepPoint> {
        let step = step.max(1);
        let minutes: Vec<usize> = (0..MINUTES_PER_DAY).step_by(step).collect();

        minutes
            .par_iter()
            .map(|&m| {
                let minute = MinuteOfDay::new(m as u16).unwrap_or(MinuteOfDay::LAST);
                let frame = self.recompute(TimeFilter::Minute(minute));
                let busiest = frame.busiest();
                SweepPoint {
                    minute,
                    departures: frame.total_departures(),
                    arrivals: frame.total_arrivals(),
                    busiest_station: busiest.map(|s| s.traffic.station_id.clone()),
                    busiest_total: busiest.map_or(0, |s| s.traffic.total_traffic),
                }
            })
            .collect()
    }
}
