//! Cache contract shared by every backend.
//!
//! Application code reads and writes named caches through [`Cache`] without
//! knowing whether entries live in process memory, on one remote store, or
//! on a shard picked from several.
//!
//! # Example
//!
//! ```no_run
//! use shardcache_core::Cache;
//! use shardcache_domain::CacheResult;
//!
//! fn remember_user(users: &impl Cache<String, String>) -> CacheResult<()> {
//!     users.put(&"user:42".to_string(), "alice".to_string())?;
//!     assert_eq!(users.get(&"user:42".to_string())?, Some("alice".to_string()));
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::hash::Hash;

use shardcache_domain::CacheResult;

/// Named key-value cache.
///
/// All operations are synchronous and may be called from many threads at
/// once. Backends hold no per-handle state beyond configuration, so a
/// handle can be cloned or rebuilt freely.
pub trait Cache<K, V>: Send + Sync
where
    K: Eq + Hash,
{
    /// Name grouping this cache's entries.
    fn name(&self) -> &str;

    /// Get the value stored under `key`.
    ///
    /// A key that was never written (or has expired) yields `Ok(None)`.
    fn get(&self, key: &K) -> CacheResult<Option<V>>;

    /// Store `value` under `key` and return it.
    fn put(&self, key: &K, value: V) -> CacheResult<V>;

    /// Delete `key`, returning the value it held.
    ///
    /// Removing an absent key yields `Ok(None)` and changes nothing.
    fn remove(&self, key: &K) -> CacheResult<Option<V>>;

    /// Delete every entry of this cache.
    fn clear(&self) -> CacheResult<()>;

    /// Number of entries currently stored.
    fn size(&self) -> CacheResult<usize>;

    /// Snapshot of all keys.
    fn keys(&self) -> CacheResult<HashSet<K>>;

    /// Snapshot of all values.
    fn values(&self) -> CacheResult<Vec<V>>;

    /// Alias of [`Cache::clear`].
    fn remove_all(&self) -> CacheResult<()> {
        self.clear()
    }
}
