use crate::index;
use crate::pipeline::{StationView, SweepPoint, TrafficFrame};
use crate::time::{self, TimeFilter};

/// Flat export row; CSV has no nesting.
#[derive(Debug, serde::Serialize)]
struct FrameRow<'a> {
    station_id: &'a str,
    departures: u32,
    arrivals: u32,
    total_traffic: u32,
    radius: f64,
    flow: f64,
}

impl<'a> From<&'a StationView> for FrameRow<'a> {
    fn from(view: &'a StationView) -> Self {
        Self {
            station_id: &view.traffic.station_id,
            departures: view.traffic.departures,
            arrivals: view.traffic.arrivals,
            total_traffic: view.traffic.total_traffic,
            radius: view.radius,
            flow: view.flow.value(),
        }
    }
}

/// Describes the slots a filter covers, e.g. `10:41 AM (window 10:41..12:40)`.
pub fn describe_filter(filter: TimeFilter) -> String {
    match filter {
        TimeFilter::AnyTime => filter.label(),
        TimeFilter::Minute(minute) => {
            let w = index::window(minute);
            format!(
                "{} (window {:02}:{:02}..{:02}:{:02})",
                time::format_minute(minute),
                w.low() / 60,
                w.low() % 60,
                w.high() / 60,
                w.high() % 60,
            )
        }
    }
}

/// Prints the `count` busiest stations of a frame.
///
/// # Example Output
/// ```text
/// Traffic at 11:40 AM (window 10:41..12:40): 412 departures, 398 arrivals
///  - M32006: dep 31, arr 12, total 43, r 25.00, flow 1
/// ```
pub fn print_frame(frame: &TrafficFrame, count: usize) {
    println!(
        "Traffic at {}: {} departures, {} arrivals",
        describe_filter(frame.filter),
        frame.total_departures(),
        frame.total_arrivals(),
    );
    for view in frame.top(count) {
        println!(
            " - {}: dep {}, arr {}, total {}, r {:.2}, flow {}",
            view.traffic.station_id,
            view.traffic.departures,
            view.traffic.arrivals,
            view.traffic.total_traffic,
            view.radius,
            view.flow.value(),
        );
    }
}

/// Prints one line per sweep point: minute, totals and the busiest station.
pub fn print_sweep(points: &[SweepPoint]) {
    for point in points {
        println!(
            " - {}: dep {}, arr {}, busiest {} ({})",
            point.minute,
            point.departures,
            point.arrivals,
            point.busiest_station.as_deref().unwrap_or("-"),
            point.busiest_total,
        );
    }
}

/// Writes a frame to `path`: JSON for a `.json` extension, CSV otherwise.
pub fn write_frame<P: AsRef<std::path::Path>>(frame: &TrafficFrame, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), frame)?;
    } else {
        let mut writer = csv::Writer::from_path(path)?;
        for view in &frame.stations {
            writer.serialize(FrameRow::from(view))?;
        }
        writer.flush()?;
    }

    tracing::info!("Wrote {} station rows to {}", frame.stations.len(), path.display());
    anyhow::Ok(())
}
