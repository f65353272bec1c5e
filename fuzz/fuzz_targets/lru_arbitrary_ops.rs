#![no_main]

use std::time::{Duration, Instant};

use libfuzzer_sys::fuzz_target;
use lrukit::policy::lru::LruCore;

// Fuzz arbitrary operation sequences on LruCore
//
// Each operation is two bytes: opcode and argument. The clock only moves
// forward, driven by the Tick opcode. Invariants are checked after every op.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = (data[0] % 32) as usize;
    let grace = Duration::from_secs(u64::from(data[1] % 4));
    let mut cache: LruCore<u32> = LruCore::with_grace_period(capacity, grace);

    let start = Instant::now();
    let mut now = start;

    for (step, pair) in data[2..].chunks_exact(2).enumerate() {
        let op = pair[0] % 9;
        let arg = pair[1];
        let key = format!("k{}", arg % 48);
        let value = step as u32;

        match op {
            0 | 1 => {
                // set with and without a deadline
                let expire = (op == 0).then(|| start + Duration::from_secs(u64::from(arg % 16)));
                let had_key = cache.contains(&key);
                let old_len = cache.len();
                cache.set_at(&key, value, expire, now);
                if capacity > 0 {
                    assert_eq!(cache.get_quiet(&key), Some(&value));
                    let expected = if had_key || old_len < capacity { old_len + usize::from(!had_key) } else { old_len };
                    assert_eq!(cache.len(), expected);
                }
            }
            2 => {
                let hit = cache.get(&key).is_some();
                assert_eq!(hit, cache.contains(&key));
            }
            3 => {
                let _ = cache.get_quiet(&key);
            }
            4 => {
                let old_len = cache.len();
                if cache.get_not_stale_at(&key, now).is_none() {
                    assert!(cache.len() + 1 >= old_len);
                } else {
                    assert_eq!(cache.len(), old_len);
                }
            }
            5 => {
                let old_len = cache.len();
                let _ = cache.get_stale_at(&key, now);
                assert_eq!(cache.len(), old_len);
            }
            6 => {
                let had_key = cache.contains(&key);
                assert_eq!(cache.remove(&key).is_some(), had_key);
                assert!(!cache.contains(&key));
            }
            7 => {
                let old_len = cache.len();
                let evicted = cache.expire_at(now);
                assert_eq!(cache.len(), old_len - evicted);
            }
            _ => {
                now += Duration::from_secs(u64::from(arg % 4));
            }
        }

        assert!(cache.len() <= cache.capacity());
        cache.debug_validate_invariants();
    }

    let len = cache.len();
    assert_eq!(cache.clear(), len);
    assert!(cache.is_empty());
});
