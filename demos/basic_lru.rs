//! Walks through eviction, expiry and sharding with trace logging enabled.
//!
//! ```text
//! RUST_LOG=lrukit=trace cargo run --example basic_lru
//! ```

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use lrukit::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basic_lru=info,lrukit=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let now = Instant::now();
    let cache: LruCache<String> = CacheBuilder::new(3)
        .grace_period(Duration::from_secs(2))
        .build();

    cache.set_at("a", "alpha".into(), Some(now + Duration::from_secs(1)), now);
    cache.set_at("b", "beta".into(), None, now);
    cache.set_at("c", "gamma".into(), Some(now + Duration::from_secs(10)), now);
    info!(len = cache.len(), capacity = cache.capacity(), "filled");

    // Five seconds later "a" is expired, so it is the victim even though "b"
    // is older.
    let later = now + Duration::from_secs(5);
    cache.set_at("d", "delta".into(), None, later);
    info!(a = ?cache.get_quiet("a"), b = ?cache.get_quiet("b"), "after inserting d");

    // Stale reads report expiry without removing anything.
    let stale = cache.get_stale_at("c", now + Duration::from_secs(11));
    info!(?stale, "stale read of c");
    let fresh = cache.get_not_stale_at("c", now + Duration::from_secs(11));
    info!(?fresh, len = cache.len(), "not-stale read of c within grace");

    let expired = cache.expire_at(now + Duration::from_secs(20));
    info!(expired, len = cache.len(), "expired");

    let sharded: Arc<ShardedLruCache<u64>> = Arc::new(
        CacheBuilder::new(256).shards(8).seed(42).build_sharded(),
    );
    let workers: Vec<_> = (0..4u64)
        .map(|t| {
            let sharded = Arc::clone(&sharded);
            thread::spawn(move || {
                for i in 0..500u64 {
                    sharded.set(&format!("user:{t}:{i}"), i, None);
                }
            })
        })
        .collect();
    for worker in workers {
        if worker.join().is_err() {
            eprintln!("worker panicked");
        }
    }
    info!(
        len = sharded.len(),
        capacity = sharded.capacity(),
        shards = sharded.shard_count(),
        "sharded fill"
    );
    info!(cleared = sharded.clear(), "sharded clear");
}
