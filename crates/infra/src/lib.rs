//! # Shardcache Infrastructure
//!
//! Infrastructure implementations of the core cache ports.
//!
//! This crate contains:
//! - The Redis connection manager and hash command adapter
//! - An in-process hash store with fault injection
//! - Consistent-hash routing across shard pools
//! - Single-endpoint, sharded and in-memory cache backends
//! - The cache managers and configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `shardcache-core`
//! - Depends on `shardcache-common` for pooling and `shardcache-domain` for types
//! - Contains all "impure" code (sockets, pools, environment, files)

pub mod cache;
pub mod config;
pub mod errors;
pub mod store;

// Re-export commonly used items
pub use cache::{
    CacheHandle, MemoryCache, MemoryCacheConfig, MemoryCacheManager, MemoryConnector,
    RedisCache, RedisCacheManager, RedisConnector, ShardedRedisCache, StoreConnector,
};
pub use errors::{classify_redis_error, map_pool_error};
pub use store::{MemoryStore, RedisConnectionManager, ShardRing, ShardedPool};
