//! Bounded Containers demo driver
//!
//! Runs a small deadline-scheduling workload through the indexed heap and the
//! expiring cache, then prints cache statistics as JSON.

use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bounded_containers::{Config, ExpiringCache, HeapEntry, IndexedHeap, ManualClock};

/// Number of jobs scheduled by the demo workload
const JOB_COUNT: i64 = 64;

/// Main entry point for the demo driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Schedule jobs in the heap, moving some deadlines earlier in place
/// 4. Run jobs in deadline order, memoizing results in the expiring cache
/// 5. Print cache statistics
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bounded_containers=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: cache_name={}, max_entries={}, default_ttl={}ms, heap_capacity={}",
        config.cache_name, config.max_entries, config.default_ttl_ms, config.heap_capacity
    );

    let clock = ManualClock::new(0);
    let mut heap = IndexedHeap::from_config(&config)?;
    let mut results: ExpiringCache<i64, String, ManualClock> =
        ExpiringCache::with_clock(config.max_entries, config.default_ttl(), clock.clone())?;

    let jobs = JOB_COUNT.min(i64::try_from(heap.capacity()).unwrap_or(i64::MAX));
    for job in 0..jobs {
        // Deadlines spread over one minute, several jobs sharing each slot
        let deadline_ms = (job * 7_919) % 60_000;
        heap.insert(HeapEntry::new(job, deadline_ms, format!("job-{}", job)))?;
    }

    // Every fifth job becomes urgent
    for job in (0..jobs).step_by(5) {
        if let Some(mut entry) = heap.lookup_mut(job) {
            *entry.priority_mut() /= 2;
        }
    }
    info!(scheduled = heap.len(), "jobs scheduled");

    while let Ok(entry) = heap.pop_min() {
        let now = u64::try_from(entry.priority).unwrap_or(0);
        clock.set(now);

        let bucket = entry.key() % 8;
        if results.get(&bucket).is_none() {
            debug!(job = entry.key(), bucket, "computing result");
            results.put(bucket, format!("{} @ {}ms", entry.value, now));
        }
    }

    clock.advance(Duration::from_millis(config.default_ttl_ms));
    let purged = results.purge_expired();
    results.finish();
    info!(purged, "workload complete");

    let stats = serde_json::to_string_pretty(&results.stats())?;
    println!("{}", stats);
    Ok(())
}
