//! Cache backends
//!
//! - [`RedisCache`]: one hash per cache name on a single endpoint
//! - [`ShardedRedisCache`]: the same layout, with the endpoint picked from
//!   the cache name by consistent hashing
//! - [`CacheHandle`]: either of the two, as configured on the manager
//! - [`MemoryCache`]: entries held in process memory with moka

pub mod handle;
pub mod manager;
pub mod memory;
mod pooled;
pub mod redis_cache;
pub mod sharded_cache;

pub use handle::CacheHandle;
pub use manager::{pool_config, MemoryConnector, PoolContext, RedisCacheManager, RedisConnector, StoreConnector};
pub use memory::{MemoryCache, MemoryCacheConfig, MemoryCacheManager};
pub use redis_cache::RedisCache;
pub use sharded_cache::ShardedRedisCache;
