use crate::circular::CircularRange;
use crate::time::{MinuteOfDay, TimeFilter, MINUTES_PER_DAY};
use crate::trips::{RawTrip, TripRecord};

/// Minutes of history before the selected minute.
pub const WINDOW_BEFORE: usize = 59;
/// Minutes of look-ahead after the selected minute (exclusive bound).
pub const WINDOW_AFTER: usize = 60;

/// Which of the two bucket arrays to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
    /// Keyed by `start_minute`.
    Departures,
    /// Keyed by `end_minute`.
    Arrivals,
}

/// Trip records bucketed by minute of day.
///
/// Owns the ingested trips plus two arrays of 1440 slots each. Every trip
/// index appears in exactly one departure slot (its start minute) and one
/// arrival slot (its end minute). Read-only once built.
#[derive(Debug, Clone)]
pub struct TripIndex {
    trips: Vec<TripRecord>,
    departures: Vec<Vec<usize>>,
    arrivals: Vec<Vec<usize>>,
    dropped: usize,
}

/// Borrowed view of one bucket array.
#[derive(Debug, Clone, Copy)]
pub struct MinuteBuckets<'a> {
    trips: &'a [TripRecord],
    slots: &'a [Vec<usize>],
}

impl TripIndex {
    /// Ingests raw trip rows in one pass.
    ///
    /// Rows whose timestamps do not parse are skipped and counted in
    /// [`TripIndex::dropped`]; they never reach a bucket.
    ///
    /// # Arguments
    /// * `raw_trips` - Trip rows in feed order.
    ///
    /// # Returns
    /// * `TripIndex` - Always valid, 1440 empty slots per array for empty input.
    pub fn build<I: IntoIterator<Item = RawTrip>>(raw_trips: I) -> Self {
        let mut records = Vec::new();
        let mut dropped = 0usize;

        for raw in raw_trips {
            match TripRecord::try_from(raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::debug!("dropping trip: {}", e);
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            tracing::warn!("{} trip(s) dropped for unparseable timestamps", dropped);
        }

        Self::from_records(records).with_dropped(dropped)
    }

    /// Buckets already-parsed records, e.g. ones loaded from the trip cache.
    pub fn from_records(trips: Vec<TripRecord>) -> Self {
        let mut departures = vec![Vec::new(); MINUTES_PER_DAY];
        let mut arrivals = vec![Vec::new(); MINUTES_PER_DAY];

        for (i, trip) in trips.iter().enumerate() {
            departures[trip.start_minute.index()].push(i);
            arrivals[trip.end_minute.index()].push(i);
        }

        Self { trips, departures, arrivals, dropped: 0 }
    }

    /// Carries over a rejected-row count, e.g. from the feed reader or cache.
    pub fn with_dropped(mut self, dropped: usize) -> Self {
        self.dropped = dropped;
        self
    }

    /// Ingested trips in feed order. Slot entries index into this slice.
    pub fn trips(&self) -> &[TripRecord] {
        &self.trips
    }

    /// Number of indexed trips, not counting dropped rows.
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// True when no trip survived ingestion.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Number of rows rejected during [`TripIndex::build`].
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Borrows one of the two bucket arrays.
    ///
    /// # Arguments
    /// * `kind` - `Departures` for slots keyed by start minute, `Arrivals` for end minute.
    ///
    /// # Returns
    /// * `MinuteBuckets` - A view of 1440 slots sharing this index's trips.
    pub fn buckets(&self, kind: BucketKind) -> MinuteBuckets<'_> {
        let slots = match kind {
            BucketKind::Departures => &self.departures,
            BucketKind::Arrivals => &self.arrivals,
        };
        MinuteBuckets { trips: &self.trips, slots }
    }

    /// Shorthand for `buckets(BucketKind::Departures)`.
    pub fn departures(&self) -> MinuteBuckets<'_> {
        self.buckets(BucketKind::Departures)
    }

    /// Shorthand for `buckets(BucketKind::Arrivals)`.
    pub fn arrivals(&self) -> MinuteBuckets<'_> {
        self.buckets(BucketKind::Arrivals)
    }
}

impl<'a> MinuteBuckets<'a> {
    /// Trips in one slot, in ingestion order.
    pub fn slot(&self, minute: MinuteOfDay) -> impl Iterator<Item = &'a TripRecord> + 'a {
        let trips = self.trips;
        let slots = self.slots;
        slots[minute.index()].iter().map(move |&i| &trips[i])
    }

    /// Number of trips in one slot.
    pub fn slot_len(&self, minute: MinuteOfDay) -> usize {
        self.slots[minute.index()].len()
    }

    fn slot_range(&self, range: std::ops::Range<usize>, out: &mut Vec<&'a TripRecord>) {
        let trips = self.trips;
        let slots = self.slots;
        for slot in &slots[range] {
            out.extend(slot.iter().map(|&i| &trips[i]));
        }
    }
}

/// The circular window of slots around `minute`:
/// `[(minute - 59) mod 1440, (minute + 60) mod 1440)`.
pub fn window(minute: MinuteOfDay) -> CircularRange {
    CircularRange::around(minute.index(), WINDOW_BEFORE, WINDOW_AFTER, MINUTES_PER_DAY)
}

/// Selects the trips of one bucket array that fall inside the filter.
///
/// `AnyTime` yields every slot in slot order. A minute yields the slots of
/// [`window`], walking `[low, 1440)` then `[0, high)` when the window wraps
/// past midnight.
pub fn select<'a>(buckets: MinuteBuckets<'a>, filter: TimeFilter) -> Vec<&'a TripRecord> {
    let mut selected = Vec::new();
    match filter {
        TimeFilter::AnyTime => buckets.slot_range(0..MINUTES_PER_DAY, &mut selected),
        TimeFilter::Minute(minute) => {
            for segment in window(minute).segments() {
                buckets.slot_range(segment, &mut selected);
            }
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hh: u32, mm: u32) -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    fn at_minute(minute: u32) -> chrono::NaiveDateTime {
        at(minute / 60, minute % 60)
    }

    fn trip(from: &str, to: &str, start: u32, end: u32) -> TripRecord {
        TripRecord::new(from, to, at_minute(start), at_minute(end))
    }

    fn minute(value: u16) -> MinuteOfDay {
        MinuteOfDay::new(value).unwrap()
    }

    #[test]
    fn test_empty_index_has_full_slot_arrays() {
        let index = TripIndex::build(Vec::<RawTrip>::new());
        assert!(index.is_empty());
        assert_eq!(index.dropped(), 0);
        assert_eq!(index.departures().slots.len(), MINUTES_PER_DAY);
        assert_eq!(index.arrivals().slots.len(), MINUTES_PER_DAY);
        assert!(select(index.departures(), TimeFilter::AnyTime).is_empty());
    }

    #[test]
    fn test_each_trip_lands_in_exactly_one_slot_per_array() {
        let trips = vec![
            trip("X", "Y", 700, 705),
            trip("Y", "X", 710, 715),
            trip("X", "X", 1439, 3),
        ];
        let index = TripIndex::from_records(trips.clone());

        for t in &trips {
            let mut dep_hits = 0;
            let mut arr_hits = 0;
            for m in 0..MINUTES_PER_DAY as u16 {
                let in_dep = index.departures().slot(minute(m)).any(|r| r == t);
                let in_arr = index.arrivals().slot(minute(m)).any(|r| r == t);
                if in_dep {
                    assert_eq!(m, t.start_minute.value());
                    dep_hits += 1;
                }
                if in_arr {
                    assert_eq!(m, t.end_minute.value());
                    arr_hits += 1;
                }
            }
            assert_eq!((dep_hits, arr_hits), (1, 1));
        }
    }

    #[test]
    fn test_build_drops_unparseable_rows() {
        let rows = vec![
            RawTrip {
                start_station_id: "X".into(),
                end_station_id: "Y".into(),
                started_at: "2024-03-01 07:00:00".into(),
                ended_at: "2024-03-01 07:10:00".into(),
            },
            RawTrip {
                start_station_id: "X".into(),
                end_station_id: "Y".into(),
                started_at: "garbage".into(),
                ended_at: "2024-03-01 07:10:00".into(),
            },
        ];
        let index = TripIndex::build(rows);
        assert_eq!(index.len(), 1);
        assert_eq!(index.dropped(), 1);
        assert_eq!(index.departures().slot_len(minute(420)), 1);
        assert_eq!(index.arrivals().slot_len(minute(430)), 1);
    }

    #[test]
    fn test_any_time_returns_all_trips_in_slot_order() {
        let index = TripIndex::from_records(vec![
            trip("A", "B", 900, 905),
            trip("B", "C", 10, 20),
            trip("C", "A", 500, 510),
        ]);
        let all = select(index.departures(), TimeFilter::AnyTime);
        let starts: Vec<u16> = all.iter().map(|t| t.start_minute.value()).collect();
        assert_eq!(starts, vec![10, 500, 900]);
    }

    #[test]
    fn test_window_bounds_follow_formula() {
        for m in [0u16, 1, 58, 59, 60, 700, 1379, 1380, 1381, 1439] {
            let w = window(minute(m));
            let m = m as usize;
            assert_eq!(w.low(), (m + 1440 - 59) % 1440);
            assert_eq!(w.high(), (m + 60) % 1440);
            assert_eq!(w.len(), 119);
        }
    }

    #[test]
    fn test_window_selection_matches_slot_membership() {
        // one trip starting at every minute of the day
        let trips: Vec<TripRecord> = (0..1440u32).map(|m| trip("S", "S", m, m)).collect();
        let index = TripIndex::from_records(trips);

        for m in [0u16, 30, 700, 1380, 1400, 1439] {
            let w = window(minute(m));
            let selected = select(index.departures(), TimeFilter::Minute(minute(m)));
            let starts: Vec<usize> = selected.iter().map(|t| t.start_minute.index()).collect();
            let expected: Vec<usize> = w.iter().collect();
            assert_eq!(starts, expected, "minute {m}");
        }
    }

    #[test]
    fn test_midnight_edges() {
        let index = TripIndex::from_records(vec![
            trip("S", "S", 1380, 1380),
            trip("S", "S", 1381, 1381),
            trip("S", "S", 1439, 1439),
            trip("S", "S", 0, 0),
            trip("S", "S", 58, 58),
            trip("S", "S", 59, 59),
            trip("S", "S", 60, 60),
        ]);
        let starts = |m: u16| -> Vec<u16> {
            select(index.departures(), TimeFilter::Minute(minute(m)))
                .iter()
                .map(|t| t.start_minute.value())
                .collect()
        };

        assert_eq!(starts(0), vec![1381, 1439, 0, 58, 59]);
        assert_eq!(starts(1439), vec![1380, 1381, 1439, 0, 58]);
    }

    #[test]
    fn test_arrival_window_uses_end_minute() {
        let index = TripIndex::from_records(vec![trip("X", "Y", 500, 700)]);
        let filter = TimeFilter::Minute(minute(700));
        assert!(select(index.departures(), filter).is_empty());
        assert_eq!(select(index.arrivals(), filter).len(), 1);
    }
}
