use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lrukit::policy::lru::LruCache;
use lrukit::policy::sharded_lru::ShardedLruCache;
use lrukit::traits::{ConcurrentCache, ExpiringCache};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const THREADS: usize = 4;
const OPS_PER_THREAD: usize = 10_000;
const KEY_SPACE: usize = 8_192;

/// 80% reads, 20% writes over a uniform key space.
fn run_mixed<C>(cache: &Arc<C>, keys: &Arc<Vec<String>>)
where
    C: ExpiringCache<u64> + ConcurrentCache + 'static,
{
    let handles: Vec<_> = (0..THREADS)
        .map(|tid| {
            let cache = Arc::clone(cache);
            let keys = Arc::clone(keys);
            thread::spawn(move || {
                let mut rng = SmallRng::seed_from_u64(tid as u64);
                for i in 0..OPS_PER_THREAD {
                    let key = &keys[rng.gen_range(0..keys.len())];
                    if rng.gen_range(0..10) < 2 {
                        cache.set(key, i as u64, None);
                    } else {
                        black_box(cache.get(key));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }
}

fn bench_contention(c: &mut Criterion) {
    let keys: Arc<Vec<String>> = Arc::new((0..KEY_SPACE).map(|i| format!("key:{i}")).collect());
    let mut group = c.benchmark_group("mixed_4_threads");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    let single = Arc::new(LruCache::<u64>::new(4_096));
    group.bench_function("single", |b| b.iter(|| run_mixed(&single, &keys)));

    for shards in [4usize, 16, 64] {
        let sharded = Arc::new(ShardedLruCache::<u64>::new(shards, 4_096 / shards));
        group.bench_with_input(BenchmarkId::new("sharded", shards), &shards, |b, _| {
            b.iter(|| run_mixed(&sharded, &keys))
        });
    }
    group.finish();
}

fn bench_shard_routing(c: &mut Criterion) {
    let cache = ShardedLruCache::<u64>::new(16, 256);
    let keys: Vec<String> = (0..1024).map(|i| format!("user:{i}")).collect();
    c.bench_function("shard_for_key", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(cache.shard_for_key(black_box(key)));
            }
        })
    });
}

criterion_group!(benches, bench_contention, bench_shard_routing);
criterion_main!(benches);
