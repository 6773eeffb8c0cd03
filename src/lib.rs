//! Time-of-day traffic aggregation for bike-share stations.
//!
//! Trips are bucketed once by start and end minute ([`index::TripIndex`]).
//! Each time filter change runs [`pipeline::TrafficEngine::recompute`], which
//! windows the buckets, counts trips per station, joins the counts onto the
//! station list and encodes radius and flow level for drawing.

pub mod aggregate;
pub mod circular;
pub mod cli;
pub mod encode;
pub mod error;
pub mod feeds;
pub mod index;
pub mod index_cache;
pub mod pipeline;
pub mod report;
pub mod settings;
pub mod stations;
pub mod time;
pub mod trips;
pub mod utils;

pub use aggregate::{StationTraffic, TrafficCounts};
pub use encode::{FlowLevel, RadiusDomain, VisualEncoder};
pub use error::TrafficError;
pub use index::TripIndex;
pub use pipeline::{StationView, TrafficEngine, TrafficFrame};
pub use stations::Station;
pub use time::{MinuteOfDay, TimeFilter};
pub use trips::{RawTrip, TripRecord};
