use crate::time::TimeFilter;

/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub stations: Option<std::path::PathBuf>,
    pub trips: Option<std::path::PathBuf>,
    pub config: Option<std::path::PathBuf>,
    pub cache: Option<std::path::PathBuf>,
    pub output: Option<std::path::PathBuf>,
    pub filter: TimeFilter,
    pub sweep: Option<usize>,
    pub top: Option<usize>,
    pub max_radius: Option<f64>,
    pub fixed_domain: Option<f64>,
    pub threads: Option<usize>,
    pub verbose: bool,
}

impl Args {
    /// Parses command-line arguments using `clap`.
    pub fn parse() -> Self {
        Self::from_matches(command().get_matches())
    }

    /// Parses from an explicit argument list; errors instead of exiting.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        command().try_get_matches_from(args).map(Self::from_matches)
    }

    fn from_matches(matches: clap::ArgMatches) -> Self {
        let path = |name: &str| matches.get_one::<String>(name).map(std::path::PathBuf::from);
        Args {
            stations: path("stations"),
            trips: path("trips"),
            config: path("config"),
            cache: path("cache"),
            output: path("output"),
            filter: matches.get_one::<TimeFilter>("minute").copied().unwrap_or(TimeFilter::AnyTime),
            sweep: matches.get_one::<usize>("sweep").copied(),
            top: matches.get_one::<usize>("top").copied(),
            max_radius: matches.get_one::<f64>("max-radius").copied(),
            fixed_domain: matches.get_one::<f64>("fixed-domain").copied(),
            threads: matches.get_one::<usize>("threads").copied(),
            verbose: matches.get_flag("verbose"),
        }
    }
}

fn command() -> clap::Command {
    clap::Command::new("bike-traffic")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bike-share station traffic by time of day")
        .arg(
            clap::Arg::new("stations")
                .short('s')
                .long("stations")
                .help("Station feed (JSON)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("trips")
                .short('i')
                .long("trips")
                .help("Trip feed (CSV with start_station_id, end_station_id, started_at, ended_at)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .help("Settings file (JSON)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("cache")
                .long("cache")
                .help("Trip cache file: read if present, written after parsing the trip feed otherwise")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the station snapshot to this file (.json or .csv)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("minute")
                .short('m')
                .long("minute")
                .help("Time filter: -1 or 'any' for the whole day, a minute 0..1439, or HH:MM")
                .num_args(1)
                .allow_hyphen_values(true)
                .value_parser(clap::builder::ValueParser::new(parse_time_filter)),
        )
        .arg(
            clap::Arg::new("sweep")
                .long("sweep")
                .help("Also summarize the whole day every N minutes")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("top")
                .short('n')
                .long("top")
                .help("Number of stations to print")
                .num_args(1)
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            clap::Arg::new("max-radius")
                .long("max-radius")
                .help("Largest circle radius in pixels")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_non_negative)),
        )
        .arg(
            clap::Arg::new("fixed-domain")
                .long("fixed-domain")
                .help("Scale radii against this total instead of the busiest station")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_non_negative)),
        )
        .arg(
            clap::Arg::new("threads")
                .short('t')
                .long("threads")
                .help("Number of threads for --sweep (default: all available)")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Debug logging")
                .action(clap::ArgAction::SetTrue),
        )
}

fn parse_time_filter(s: &str) -> Result<TimeFilter, String> {
    s.parse::<TimeFilter>().map_err(|e| e.to_string())
}

/// Validates that the value is a positive integer.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

fn parse_non_negative(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(v) => Err(format!("Must be a non-negative number, got {}", v)),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}
