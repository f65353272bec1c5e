pub use crate::builder::CacheBuilder;
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::lru::{LruCache, LruCore};
pub use crate::policy::sharded_lru::ShardedLruCache;
pub use crate::traits::{ConcurrentCache, ExpiringCache};
