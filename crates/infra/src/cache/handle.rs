//! Cache handle returned by the manager

use std::collections::HashSet;
use std::hash::Hash;

use r2d2::ManageConnection;
use shardcache_core::{Cache, HashStore};
use shardcache_domain::CacheResult;

use super::redis_cache::RedisCache;
use super::sharded_cache::ShardedRedisCache;
use crate::store::RedisConnectionManager;

/// Single-endpoint or sharded cache, chosen by the manager configuration
#[derive(Debug)]
pub enum CacheHandle<K, V, M = RedisConnectionManager>
where
    M: ManageConnection,
{
    Single(RedisCache<K, V, M>),
    Sharded(ShardedRedisCache<K, V, M>),
}

impl<K, V, M> CacheHandle<K, V, M>
where
    M: ManageConnection,
{
    pub fn is_sharded(&self) -> bool {
        matches!(self, Self::Sharded(_))
    }
}

impl<K, V, M> Clone for CacheHandle<K, V, M>
where
    M: ManageConnection,
{
    fn clone(&self) -> Self {
        match self {
            Self::Single(cache) => Self::Single(cache.clone()),
            Self::Sharded(cache) => Self::Sharded(cache.clone()),
        }
    }
}

impl<K, V, M> Cache<K, V> for CacheHandle<K, V, M>
where
    K: Eq + Hash,
    M: ManageConnection,
    M::Connection: HashStore,
{
    fn name(&self) -> &str {
        match self {
            Self::Single(cache) => cache.name(),
            Self::Sharded(cache) => cache.name(),
        }
    }

    fn get(&self, key: &K) -> CacheResult<Option<V>> {
        match self {
            Self::Single(cache) => cache.get(key),
            Self::Sharded(cache) => cache.get(key),
        }
    }

    fn put(&self, key: &K, value: V) -> CacheResult<V> {
        match self {
            Self::Single(cache) => cache.put(key, value),
            Self::Sharded(cache) => cache.put(key, value),
        }
    }

    fn remove(&self, key: &K) -> CacheResult<Option<V>> {
        match self {
            Self::Single(cache) => cache.remove(key),
            Self::Sharded(cache) => cache.remove(key),
        }
    }

    fn clear(&self) -> CacheResult<()> {
        match self {
            Self::Single(cache) => cache.clear(),
            Self::Sharded(cache) => cache.clear(),
        }
    }

    fn size(&self) -> CacheResult<usize> {
        match self {
            Self::Single(cache) => cache.size(),
            Self::Sharded(cache) => cache.size(),
        }
    }

    fn keys(&self) -> CacheResult<HashSet<K>> {
        match self {
            Self::Single(cache) => cache.keys(),
            Self::Sharded(cache) => cache.keys(),
        }
    }

    fn values(&self) -> CacheResult<Vec<V>> {
        match self {
            Self::Single(cache) => cache.values(),
            Self::Sharded(cache) => cache.values(),
        }
    }
}
