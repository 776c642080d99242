//! Remote cache manager
//!
//! Owns the connection pools for the configured endpoints and hands out
//! cache handles bound to them. The manager moves through three states:
//!
//! ```text
//! Uninitialized --init()--> Running --destroy()--> Destroyed
//! ```
//!
//! Handles are cheap wrappers over the shared pools; asking twice for the
//! same cache name yields two handles over the same stored hash.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use r2d2::ManageConnection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shardcache_common::pool::{HealthStatus, PoolConfig, PoolMetricsSnapshot, StorePool};
use shardcache_core::CacheCodec;
use shardcache_domain::{CacheError, CacheManagerConfig, CacheResult, Endpoint, PoolSettings};
use tracing::{info, instrument};

use super::handle::CacheHandle;
use super::redis_cache::RedisCache;
use super::sharded_cache::ShardedRedisCache;
use crate::errors::map_pool_error;
use crate::store::{MemoryStore, MemoryStoreManager, RedisConnectionManager, ShardedPool};

/// Builds the r2d2 connection manager for one endpoint
pub trait StoreConnector: Send + Sync {
    type Manager: ManageConnection;

    /// Manager opening connections to `endpoint`
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` if the endpoint cannot be used.
    fn manager(&self, endpoint: &Endpoint, config: &CacheManagerConfig) -> CacheResult<Self::Manager>;
}

/// Connects to Redis servers
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

impl StoreConnector for RedisConnector {
    type Manager = RedisConnectionManager;

    fn manager(&self, endpoint: &Endpoint, config: &CacheManagerConfig) -> CacheResult<RedisConnectionManager> {
        RedisConnectionManager::new(
            endpoint,
            config.password(),
            Duration::from_millis(config.pool.socket_timeout_ms),
        )
    }
}

/// Connects to in-process stores, one per endpoint
///
/// The same endpoint always maps to the same [`MemoryStore`], so tests can
/// inspect the data or inject faults through [`MemoryConnector::store_for`].
#[derive(Debug, Default)]
pub struct MemoryConnector {
    stores: Mutex<HashMap<Endpoint, MemoryStore>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store behind `endpoint`, created on first use
    pub fn store_for(&self, endpoint: &Endpoint) -> MemoryStore {
        self.stores.lock().entry(endpoint.clone()).or_default().clone()
    }
}

impl StoreConnector for MemoryConnector {
    type Manager = MemoryStoreManager;

    fn manager(&self, endpoint: &Endpoint, _config: &CacheManagerConfig) -> CacheResult<MemoryStoreManager> {
        Ok(MemoryStoreManager::new(self.store_for(endpoint), endpoint.to_string()))
    }
}

/// Pools shared by every handle of one manager
pub enum PoolContext<M: ManageConnection> {
    Single(Arc<StorePool<M>>),
    Sharded(Arc<ShardedPool<M>>),
}

impl<M: ManageConnection> PoolContext<M> {
    fn pools(&self) -> Vec<&Arc<StorePool<M>>> {
        match self {
            Self::Single(pool) => vec![pool],
            Self::Sharded(shards) => shards.pools().iter().collect(),
        }
    }

    fn close(&self) {
        match self {
            Self::Single(pool) => pool.close(),
            Self::Sharded(shards) => shards.close(),
        }
    }
}

impl<M: ManageConnection> Clone for PoolContext<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Single(pool) => Self::Single(Arc::clone(pool)),
            Self::Sharded(shards) => Self::Sharded(Arc::clone(shards)),
        }
    }
}

enum ManagerState<M: ManageConnection> {
    Uninitialized,
    Running(PoolContext<M>),
    Destroyed,
}

/// Pool settings from the manager configuration
pub fn pool_config(settings: &PoolSettings) -> PoolConfig {
    PoolConfig {
        max_size: settings.max_size,
        min_idle: settings.min_idle,
        test_on_borrow: settings.test_on_borrow,
        connection_timeout: Duration::from_millis(settings.checkout_timeout_ms),
        idle_timeout: None,
    }
}

/// Cache manager over Redis (or any [`StoreConnector`])
pub struct RedisCacheManager<C: StoreConnector = RedisConnector> {
    config: CacheManagerConfig,
    connector: C,
    state: RwLock<ManagerState<C::Manager>>,
}

impl RedisCacheManager<RedisConnector> {
    pub fn new(config: CacheManagerConfig) -> Self {
        Self::with_connector(config, RedisConnector)
    }
}

impl<C: StoreConnector> RedisCacheManager<C> {
    pub fn with_connector(config: CacheManagerConfig, connector: C) -> Self {
        Self { config, connector, state: RwLock::new(ManagerState::Uninitialized) }
    }

    pub fn config(&self) -> &CacheManagerConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Create the connection pools
    ///
    /// One pool for a single host, one per entry for a sharded host list.
    /// Pools are lazy, so an unreachable endpoint is not detected here.
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` if the configuration is invalid,
    /// the manager is already initialized, or it was destroyed.
    #[instrument(skip(self), fields(sharded = self.config.sharded))]
    pub fn init(&self) -> CacheResult<()> {
        let mut state = self.state.write();
        match *state {
            ManagerState::Running(_) => {
                return Err(CacheError::config("cache manager is already initialized"))
            }
            ManagerState::Destroyed => return Err(CacheError::config("cache manager was destroyed")),
            ManagerState::Uninitialized => {}
        }

        self.config.validate()?;
        let endpoints = self.config.endpoints()?;
        let pool_config = pool_config(&self.config.pool);

        let context = if self.config.sharded {
            let pools = endpoints
                .iter()
                .map(|endpoint| self.build_pool(endpoint, &pool_config))
                .collect::<CacheResult<Vec<_>>>()?;
            PoolContext::Sharded(Arc::new(ShardedPool::new(pools)?))
        } else {
            let endpoint = endpoints
                .first()
                .ok_or_else(|| CacheError::config("no endpoint configured"))?;
            PoolContext::Single(self.build_pool(endpoint, &pool_config)?)
        };

        info!(endpoints = endpoints.len(), "Cache manager initialized");
        *state = ManagerState::Running(context);
        Ok(())
    }

    fn build_pool(&self, endpoint: &Endpoint, config: &PoolConfig) -> CacheResult<Arc<StorePool<C::Manager>>> {
        let manager = self.connector.manager(endpoint, &self.config)?;
        let pool = StorePool::new(&endpoint.to_string(), manager, config.clone()).map_err(map_pool_error)?;
        Ok(Arc::new(pool))
    }

    /// Close every pool
    ///
    /// Does nothing when the manager was never initialized or is already
    /// destroyed. Handles created earlier fail with a connectivity error
    /// from then on. Each handle keeps its pool alive, so idle connections
    /// are only closed once the last handle to that pool is dropped.
    pub fn destroy(&self) {
        let mut state = self.state.write();
        if let ManagerState::Running(context) = &*state {
            context.close();
            *state = ManagerState::Destroyed;
            info!("Cache manager destroyed");
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(*self.state.read(), ManagerState::Running(_))
    }

    fn context(&self) -> CacheResult<PoolContext<C::Manager>> {
        match &*self.state.read() {
            ManagerState::Running(context) => Ok(context.clone()),
            ManagerState::Uninitialized => Err(CacheError::config("cache manager is not initialized")),
            ManagerState::Destroyed => Err(CacheError::config("cache manager was destroyed")),
        }
    }

    /// Cache storing keys and values with the binary serializer
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` unless the manager is running.
    pub fn get_cache<K, V>(&self, name: &str) -> CacheResult<CacheHandle<K, V, C::Manager>>
    where
        K: Serialize + DeserializeOwned + 'static,
        V: Serialize + DeserializeOwned + 'static,
    {
        self.get_cache_with_codec(name, CacheCodec::binary())
    }

    /// Cache storing keys and values as JSON bound to `K` and `V`
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` unless the manager is running.
    pub fn get_typed_cache<K, V>(&self, name: &str) -> CacheResult<CacheHandle<K, V, C::Manager>>
    where
        K: Serialize + DeserializeOwned + 'static,
        V: Serialize + DeserializeOwned + 'static,
    {
        self.get_cache_with_codec(name, CacheCodec::json())
    }

    /// Cache using caller-supplied serializers
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` unless the manager is running.
    pub fn get_cache_with_codec<K, V>(
        &self,
        name: &str,
        codec: CacheCodec<K, V>,
    ) -> CacheResult<CacheHandle<K, V, C::Manager>> {
        Ok(match self.context()? {
            PoolContext::Single(pool) => CacheHandle::Single(RedisCache::new(name, pool, codec)),
            PoolContext::Sharded(shards) => {
                CacheHandle::Sharded(ShardedRedisCache::new(name, shards, codec))
            }
        })
    }

    /// Health of every pool, keyed by endpoint in shard order
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` unless the manager is running.
    pub fn health_check(&self) -> CacheResult<IndexMap<String, HealthStatus>> {
        let context = self.context()?;
        Ok(context
            .pools()
            .into_iter()
            .map(|pool| (pool.endpoint().to_string(), pool.health_check()))
            .collect())
    }

    /// Counters of every pool, keyed by endpoint in shard order
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` unless the manager is running.
    pub fn metrics(&self) -> CacheResult<IndexMap<String, PoolMetricsSnapshot>> {
        let context = self.context()?;
        Ok(context
            .pools()
            .into_iter()
            .map(|pool| (pool.endpoint().to_string(), pool.metrics().snapshot()))
            .collect())
    }
}

impl<C: StoreConnector> fmt::Debug for RedisCacheManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.read() {
            ManagerState::Uninitialized => "uninitialized",
            ManagerState::Running(_) => "running",
            ManagerState::Destroyed => "destroyed",
        };
        f.debug_struct("RedisCacheManager")
            .field("host", &self.config.host)
            .field("sharded", &self.config.sharded)
            .field("state", &state)
            .finish()
    }
}
