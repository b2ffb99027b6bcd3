//! Batched Eviction Walkthrough
//!
//! Shows how the threshold changes when the cache evicts, how promotion protects
//! entries, and what the metrics report afterwards.
//!
//! Run with: cargo run --example eviction_demo

extern crate keyed_cache;

use core::num::NonZeroUsize;
use keyed_cache::config::CacheConfig;
use keyed_cache::metrics::CacheMetrics;
use keyed_cache::Cache;

fn config(maximum: usize, threshold: f64) -> CacheConfig {
    CacheConfig {
        initial_capacity: NonZeroUsize::new(maximum).unwrap(),
        maximum_capacity: NonZeroUsize::new(maximum).unwrap(),
        threshold,
    }
}

fn order(cache: &Cache<&'static str, u32>) -> String {
    cache
        .iter()
        .map(|entry| *entry.key())
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() {
    println!("Batched Eviction");
    println!("================\n");

    threshold_comparison();
    println!();

    promotion();
    println!();

    timestamps_and_disposal();
}

/// Same workload under different thresholds
fn threshold_comparison() {
    println!("1. Threshold Comparison (maximum_capacity = 4)");
    println!("   -------------------------------------------");

    let keys = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
    for threshold in [0.0, 0.25, 0.5, 1.0] {
        let mut cache = Cache::init(config(4, threshold), None);
        let mut sizes = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            cache.add_entry(*key, i as u32);
            sizes.push(cache.len().to_string());
        }
        println!(
            "   threshold {:<4} sizes [{}]  passes {}",
            threshold,
            sizes.join(" "),
            cache.lru_metrics().eviction_passes
        );
    }
}

/// A lookup moves an entry to the head and out of the eviction zone
fn promotion() {
    println!("2. Promotion");
    println!("   ---------");

    let mut cache = Cache::init(config(4, 0.25), None);
    for (i, key) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
        cache.add_entry(key, i as u32);
    }
    println!("   after a..e:   {}", order(&cache));

    cache.get_entry("a");
    println!("   after get a:  {}", order(&cache));

    cache.add_entry("f", 5);
    println!("   after add f:  {}", order(&cache));
}

/// Timestamps travel with entries; dispose ends the cache's life
fn timestamps_and_disposal() {
    println!("3. Timestamps and Disposal");
    println!("   -----------------------");

    let mut cache = Cache::init(config(8, 0.25), None);
    cache.add_entry_at("config", 1, 1_000);
    cache.add_entry_at("schema", 2, 1_050);

    if let Some(mut entry) = cache.get_entry("config") {
        entry.set_timestamp(2_000);
        println!(
            "   {} refreshed at {}",
            entry.key(),
            entry.timestamp()
        );
    }

    let stale: Vec<_> = cache
        .iter()
        .filter(|entry| entry.timestamp() < 1_500)
        .map(|entry| *entry.key())
        .collect();
    for key in &stale {
        cache.remove(key);
    }
    println!("   dropped stale entries: {:?}", stale);

    for (name, value) in cache.metrics() {
        println!("   {:<24} {}", name, value);
    }

    cache.dispose();
    println!("   disposed: {}", cache.is_disposed());
}
