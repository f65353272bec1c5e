#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::ds::{EntryPool, SlotId};

// Fuzz arbitrary acquire/release/touch sequences on EntryPool
//
// Mirrors the pool in a Vec of used ids ordered MRU first and compares
// after every operation.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let capacity = (data[0] % 64) as usize;
    let mut pool: EntryPool<usize> = EntryPool::new(capacity, |id| id.index());
    let mut model: Vec<SlotId> = Vec::new();

    for pair in data[1..].chunks_exact(2) {
        let op = pair[0] % 3;
        let pick = pair[1] as usize;

        match op {
            0 => {
                // acquire
                match pool.acquire() {
                    Some(id) => {
                        assert_eq!(*pool.get(id), id.index());
                        model.insert(0, id);
                    }
                    None => assert_eq!(model.len(), capacity),
                }
            }
            1 => {
                // release
                if !model.is_empty() {
                    let id = model.remove(pick % model.len());
                    assert!(pool.release(id));
                    assert!(!pool.release(id));
                }
            }
            _ => {
                // touch
                if !model.is_empty() {
                    let id = model.remove(pick % model.len());
                    assert!(pool.touch(id));
                    model.insert(0, id);
                }
            }
        }

        assert_eq!(pool.used_len(), model.len());
        assert_eq!(pool.free_len(), capacity - model.len());
        assert_eq!(pool.iter_used().collect::<Vec<_>>(), model);
        assert_eq!(pool.least_recent(), model.last().copied());
        pool.debug_validate_invariants();
    }
});
