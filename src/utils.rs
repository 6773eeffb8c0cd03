/// Configures a Rayon thread pool with the given size, used for day sweeps.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}

/// Resolves the requested thread count against the machine.
///
/// `None` means the global pool's size; requests above the CPU count are
/// capped with a warning.
pub fn effective_threads(requested: Option<usize>) -> anyhow::Result<usize> {
    match requested {
        Some(0) => Err(anyhow::anyhow!("Number of threads must be a positive integer")),
        Some(n) => {
            let max_threads = num_cpus::get();
            if n > max_threads {
                tracing::warn!("Limiting thread count to {} (max available)", max_threads);
                Ok(max_threads)
            } else {
                Ok(n)
            }
        }
        None => Ok(rayon::current_num_threads()),
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks debug over info.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_threads() {
        assert!(effective_threads(Some(0)).is_err());
        assert_eq!(effective_threads(Some(1)).unwrap(), 1);
        assert_eq!(effective_threads(Some(usize::MAX)).unwrap(), num_cpus::get());
        assert!(effective_threads(None).unwrap() >= 1);
    }

    #[test]
    fn test_thread_pool_size() {
        let pool = configure_thread_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }
}
