//! Cache backed by one store endpoint

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use r2d2::ManageConnection;
use shardcache_common::pool::StorePool;
use shardcache_core::{hash_ops, Cache, CacheCodec, HashStore};
use shardcache_domain::CacheResult;
use tracing::instrument;

use super::pooled::with_connection;
use crate::store::RedisConnectionManager;

/// Named cache stored as one hash on a single endpoint
///
/// Each operation borrows one connection from the shared pool for its whole
/// duration.
pub struct RedisCache<K, V, M = RedisConnectionManager>
where
    M: ManageConnection,
{
    name: String,
    pool: Arc<StorePool<M>>,
    codec: CacheCodec<K, V>,
}

impl<K, V, M> RedisCache<K, V, M>
where
    M: ManageConnection,
{
    pub fn new(name: impl Into<String>, pool: Arc<StorePool<M>>, codec: CacheCodec<K, V>) -> Self {
        Self { name: name.into(), pool, codec }
    }

    pub fn pool(&self) -> &Arc<StorePool<M>> {
        &self.pool
    }
}

impl<K, V, M> Clone for RedisCache<K, V, M>
where
    M: ManageConnection,
{
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), pool: Arc::clone(&self.pool), codec: self.codec.clone() }
    }
}

impl<K, V, M> fmt::Debug for RedisCache<K, V, M>
where
    M: ManageConnection,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("name", &self.name)
            .field("endpoint", &self.pool.endpoint())
            .field("codec", &self.codec)
            .finish()
    }
}

impl<K, V, M> Cache<K, V> for RedisCache<K, V, M>
where
    K: Eq + Hash,
    M: ManageConnection,
    M::Connection: HashStore,
{
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, key), fields(cache = %self.name))]
    fn get(&self, key: &K) -> CacheResult<Option<V>> {
        with_connection(&self.pool, &self.name, "get", |conn| {
            hash_ops::get(conn, &self.name, &self.codec, key)
        })
    }

    #[instrument(skip(self, key, value), fields(cache = %self.name))]
    fn put(&self, key: &K, value: V) -> CacheResult<V> {
        with_connection(&self.pool, &self.name, "put", |conn| {
            hash_ops::put(conn, &self.name, &self.codec, key, value)
        })
    }

    #[instrument(skip(self, key), fields(cache = %self.name))]
    fn remove(&self, key: &K) -> CacheResult<Option<V>> {
        with_connection(&self.pool, &self.name, "remove", |conn| {
            hash_ops::remove(conn, &self.name, &self.codec, key)
        })
    }

    #[instrument(skip(self), fields(cache = %self.name))]
    fn clear(&self) -> CacheResult<()> {
        with_connection(&self.pool, &self.name, "clear", |conn| hash_ops::clear(conn, &self.name))
    }

    fn size(&self) -> CacheResult<usize> {
        with_connection(&self.pool, &self.name, "size", |conn| hash_ops::size(conn, &self.name))
    }

    fn keys(&self) -> CacheResult<HashSet<K>> {
        with_connection(&self.pool, &self.name, "keys", |conn| {
            hash_ops::keys(conn, &self.name, &self.codec)
        })
    }

    fn values(&self) -> CacheResult<Vec<V>> {
        with_connection(&self.pool, &self.name, "values", |conn| {
            hash_ops::values(conn, &self.name, &self.codec)
        })
    }
}
