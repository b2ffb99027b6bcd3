//! Shared Cache Usage
//!
//! Demonstrates a `SharedCache` used from several threads.
//!
//! Run with: cargo run --example shared_usage --features concurrent

extern crate keyed_cache;

use keyed_cache::config::CacheConfig;
use keyed_cache::metrics::CacheMetrics;
use keyed_cache::SharedCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("Shared Cache Usage");
    println!("==================\n");

    let config = CacheConfig {
        initial_capacity: NonZeroUsize::new(256).unwrap(),
        maximum_capacity: NonZeroUsize::new(1000).unwrap(),
        threshold: 0.25,
    };
    let cache: Arc<SharedCache<String, usize>> = Arc::new(SharedCache::init(config, None));

    let num_threads = 4;
    let ops_per_thread = 5000;
    let start = Instant::now();

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = format!("key{}", (thread_id * 7 + i) % 1500);
                    if cache.get(&key).is_none() {
                        cache.put(key, i);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    println!(
        "   {} lookups across {} threads in {:?}",
        num_threads * ops_per_thread,
        num_threads,
        start.elapsed()
    );
    println!("   Final cache size: {} items", cache.len());

    // Entry views stay inside the lock
    let newest = cache.with(|cache| {
        cache
            .iter()
            .take(3)
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>()
    });
    println!("   Most recently used: {:?}", newest);

    let metrics = cache.metrics();
    println!(
        "   hit rate {:.3}, evictions {}, eviction passes {}",
        metrics["hit_rate"], metrics["evictions"], metrics["eviction_passes"]
    );
}
