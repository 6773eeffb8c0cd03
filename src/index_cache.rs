use crate::error::TrafficError;
use crate::index::TripIndex;
use crate::trips::TripRecord;

/// Bumped whenever `TripRecord`'s serialized layout changes.
pub const CACHE_VERSION: u32 = 1;

/// On-disk form of an ingested trip set.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct CachedTrips {
    version: u32,
    dropped: u64,
    trips: Vec<TripRecord>,
}

#[derive(Debug, serde::Serialize)]
struct CachedTripsRef<'a> {
    version: u32,
    dropped: u64,
    trips: &'a [TripRecord],
}

/// Serializes the index's trips with bincode.
///
/// Only ingested trips are stored; buckets are rebuilt on load.
///
/// # Arguments
/// * `index` - Index to persist.
/// * `path` - Destination `.idx` file.
pub fn save_trip_cache<P: AsRef<std::path::Path>>(index: &TripIndex, path: P) -> anyhow::Result<()> {
    let cached = CachedTripsRef {
        version: CACHE_VERSION,
        dropped: index.dropped() as u64,
        trips: index.trips(),
    };
    let data = bincode::serialize(&cached)?;
    std::fs::write(path.as_ref(), data)?;
    tracing::info!("Saved {} trips to cache {}", index.len(), path.as_ref().display());
    anyhow::Ok(())
}

/// Memory-maps a cache file and rebuilds the index from it.
///
/// # Errors
/// * If the file cannot be opened or mapped.
/// * If the content does not decode.
/// * `TrafficError::CacheVersion` if it was written by another layout.
pub fn load_trip_cache<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<TripIndex> {
    let file = std::fs::File::open(path.as_ref())?;
    let mmap = unsafe { memmap2::Mmap::map(&file)? };

    let cached: CachedTrips = bincode::deserialize(&mmap)
        .map_err(|e| anyhow::anyhow!("Failed to decode trip cache {}: {}", path.as_ref().display(), e))?;
    if cached.version != CACHE_VERSION {
        return Err(TrafficError::CacheVersion {
            found: cached.version,
            expected: CACHE_VERSION,
        }
        .into());
    }

    let index = TripIndex::from_records(cached.trips).with_dropped(cached.dropped as usize);
    tracing::info!("Loaded {} trips from cache {}", index.len(), path.as_ref().display());
    anyhow::Ok(index)
}
