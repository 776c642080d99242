//! In-process cache backend with moka
//!
//! Entries live in the current process only. Each entry expires
//! `time_to_live` after it was written, and the least useful entries are
//! evicted once a cache holds `max_capacity` of them.
//!
//! # Example
//!
//! ```rust,ignore
//! use shardcache_infra::cache::{MemoryCacheConfig, MemoryCacheManager};
//!
//! let manager = MemoryCacheManager::new(MemoryCacheConfig::default());
//! let sessions = manager.get_cache::<String, u64>("sessions")?;
//! sessions.put(&"abc".to_string(), 42)?;
//! ```

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use moka::sync::Cache as MokaCache;
use parking_lot::Mutex;
use shardcache_core::Cache;
use shardcache_domain::constants::CACHE_EXPIRE_SECS;
use shardcache_domain::{CacheError, CacheResult};
use tracing::{debug, info};

/// Default upper bound on entries per cache
pub const DEFAULT_MEMORY_CACHE_CAPACITY: u64 = 10_000;

/// Sizing and expiry of every cache created by a [`MemoryCacheManager`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries per cache
    pub max_capacity: u64,

    /// Entry lifetime after its last write (None = never expires)
    pub time_to_live: Option<Duration>,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MEMORY_CACHE_CAPACITY,
            time_to_live: Some(Duration::from_secs(CACHE_EXPIRE_SECS.unsigned_abs())),
        }
    }
}

impl MemoryCacheConfig {
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub fn with_time_to_live(mut self, ttl: Option<Duration>) -> Self {
        self.time_to_live = ttl;
        self
    }
}

/// Named cache held in process memory
///
/// Clones share the same entries.
pub struct MemoryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: String,
    inner: MokaCache<K, V>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, config: &MemoryCacheConfig) -> Self {
        let mut builder = MokaCache::builder().max_capacity(config.max_capacity);
        if let Some(ttl) = config.time_to_live {
            builder = builder.time_to_live(ttl);
        }
        Self { name: name.into(), inner: builder.build() }
    }
}

impl<K, V> Clone for MemoryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), inner: self.inner.clone() }
    }
}

impl<K, V> fmt::Debug for MemoryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("name", &self.name)
            .field("max_capacity", &self.inner.policy().max_capacity())
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &K) -> CacheResult<Option<V>> {
        let value = self.inner.get(key);
        if value.is_none() {
            debug!(cache = %self.name, "Cache miss (memory)");
        }
        Ok(value)
    }

    fn put(&self, key: &K, value: V) -> CacheResult<V> {
        self.inner.insert(key.clone(), value.clone());
        Ok(value)
    }

    fn remove(&self, key: &K) -> CacheResult<Option<V>> {
        Ok(self.inner.remove(key))
    }

    fn clear(&self) -> CacheResult<()> {
        // Invalidate key by key so the removal is visible to `size` at once
        let keys: Vec<_> = self.inner.iter().map(|(key, _)| key).collect();
        for key in keys {
            self.inner.invalidate(&*key);
        }
        Ok(())
    }

    fn size(&self) -> CacheResult<usize> {
        Ok(self.inner.iter().count())
    }

    fn keys(&self) -> CacheResult<HashSet<K>> {
        Ok(self.inner.iter().map(|(key, _)| K::clone(&key)).collect())
    }

    fn values(&self) -> CacheResult<Vec<V>> {
        Ok(self.inner.iter().map(|(_, value)| value).collect())
    }
}

/// Hands out named in-process caches
///
/// Asking twice for the same name returns handles over the same entries,
/// as long as the key and value types agree.
pub struct MemoryCacheManager {
    config: MemoryCacheConfig,
    caches: Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl MemoryCacheManager {
    pub fn new(config: MemoryCacheConfig) -> Self {
        info!(
            max_capacity = config.max_capacity,
            ttl_seconds = config.time_to_live.map(|ttl| ttl.as_secs()),
            "Memory cache manager created"
        );
        Self { config, caches: Mutex::new(HashMap::new()) }
    }

    pub fn config(&self) -> &MemoryCacheConfig {
        &self.config
    }

    /// Cache named `name`, created on first use
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` if `name` was first requested
    /// with different key or value types.
    pub fn get_cache<K, V>(&self, name: &str) -> CacheResult<MemoryCache<K, V>>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut caches = self.caches.lock();
        let entry = caches.entry(name.to_string()).or_insert_with(|| {
            let cache: Box<dyn Any + Send + Sync> = Box::new(MemoryCache::<K, V>::new(name, &self.config));
            cache
        });

        entry.downcast_ref::<MemoryCache<K, V>>().cloned().ok_or_else(|| {
            CacheError::config(format!(
                "cache '{}' already exists with different key or value types than {} -> {}",
                name,
                std::any::type_name::<K>(),
                std::any::type_name::<V>()
            ))
        })
    }

    /// Names of the caches created so far
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.caches.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Forget every cache; handles already given out keep their entries
    pub fn destroy(&self) {
        self.caches.lock().clear();
    }
}

impl Default for MemoryCacheManager {
    fn default() -> Self {
        Self::new(MemoryCacheConfig::default())
    }
}

impl fmt::Debug for MemoryCacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCacheManager")
            .field("config", &self.config)
            .field("caches", &self.cache_names())
            .finish()
    }
}
