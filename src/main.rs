use bike_traffic::{cli, feeds, index_cache, report, settings, utils};
use bike_traffic::{RadiusDomain, TrafficEngine, TripIndex};

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments and the optional settings file.
/// 2. Loads the station feed.
/// 3. Builds the trip index from the trip cache or the trip feed.
/// 4. Recomputes station traffic for the requested time filter and prints it.
/// 5. Optionally exports the snapshot and sweeps the whole day.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    let total_start = std::time::Instant::now();
    let args = cli::Args::parse();
    utils::init_logging(args.verbose);

    let mut settings = match &args.config {
        Some(path) => settings::Settings::load(path)?,
        None => settings::Settings::default(),
    };
    if let Some(max_radius) = args.max_radius {
        settings.max_radius = max_radius;
    }
    if let Some(max) = args.fixed_domain {
        settings.radius_domain = RadiusDomain::Fixed(max);
    }
    if let Some(top) = args.top {
        settings.top = top;
    }
    let cache_path = args.cache.clone().or_else(|| settings.cache.clone());

    let stations_path = args
        .stations
        .clone()
        .or_else(|| settings.stations.clone())
        .ok_or_else(|| anyhow::anyhow!("No station feed given (use --stations or the settings file)"))?;
    let stations = feeds::load_stations(&stations_path)?;

    let index = match &cache_path {
        Some(path) if path.exists() => index_cache::load_trip_cache(path)?,
        _ => {
            let trips_path = args
                .trips
                .clone()
                .or_else(|| settings.trips.clone())
                .ok_or_else(|| anyhow::anyhow!("No trip feed given (use --trips or the settings file)"))?;
            let index = build_index(&trips_path)?;
            if let Some(path) = &cache_path {
                index_cache::save_trip_cache(&index, path)?;
            }
            index
        }
    };
    println!(
        "Indexed {} trips ({} dropped) across {} stations in {:?} seconds",
        index.len(),
        index.dropped(),
        stations.len(),
        total_start.elapsed().as_secs_f64()
    );

    let engine = TrafficEngine::new(index, stations, settings.encoder());

    let start = std::time::Instant::now();
    let frame = engine.recompute(args.filter);
    report::print_frame(&frame, settings.top);
    tracing::debug!("Recompute took {:?}", start.elapsed());

    if let Some(output) = &args.output {
        report::write_frame(&frame, output)?;
    }

    if let Some(step) = args.sweep {
        let threads = utils::effective_threads(args.threads)?;
        println!("Sweeping the day every {} minute(s) on {} thread(s)", step, threads);
        let start = std::time::Instant::now();

        let points = if args.threads.is_some() {
            let pool = utils::configure_thread_pool(threads)?;
            pool.install(|| engine.sweep(step))
        } else {
            engine.sweep(step)
        };
        report::print_sweep(&points);
        println!("Sweep completed in {:?} seconds", start.elapsed().as_secs_f64());
    }

    Ok(())
}

/// Reads the trip feed behind a spinner and buckets it.
fn build_index(path: &std::path::Path) -> anyhow::Result<TripIndex> {
    let spinner = feeds::progress_spinner(std::io::IsTerminal::is_terminal(&std::io::stderr()), "Reading trips");
    let feed = feeds::load_trips(path, &spinner)?;
    spinner.finish_and_clear();

    if feed.malformed > 0 {
        println!("Skipped {} malformed trip row(s)", feed.malformed);
    }
    anyhow::Ok(TripIndex::build(feed.rows))
}
