#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::ds::ShardSelector;

// Fuzz shard selection over arbitrary string keys
//
// Every key maps into range and maps the same way twice. Enough distinct
// keys should land on more than one shard.
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let shard_count = (data[0] as usize % 16) + 2;
    let seed = u64::from(data[1]);
    let selector = ShardSelector::new(shard_count, seed);

    let mut shard_counts = vec![0usize; shard_count];
    let mut keys = std::collections::HashSet::new();

    for chunk in data[2..].chunks(3) {
        let key = String::from_utf8_lossy(chunk).into_owned();
        let shard = selector.shard_for_key(key.as_str());
        assert!(shard < shard_count);
        assert_eq!(selector.shard_for_key(key.as_str()), shard);
        shard_counts[shard] += 1;
        keys.insert(key);
    }

    let used_shards = shard_counts.iter().filter(|&&count| count > 0).count();
    assert!(used_shards > 0 || keys.is_empty());
});
