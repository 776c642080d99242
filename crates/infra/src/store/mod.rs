//! Store connections and routing
//!
//! - [`redis_store`]: r2d2 manager for Redis connections and the hash
//!   command adapter over them
//! - [`memory_store`]: in-process hash store with fault injection, pooled
//!   the same way as Redis
//! - [`sharding`]: consistent-hash ring and the per-shard pool set

pub mod memory_store;
pub mod redis_store;
pub mod sharding;

pub use memory_store::{MemoryConnection, MemoryStore, MemoryStoreError, MemoryStoreManager};
pub use redis_store::{RedisConnection, RedisConnectionManager};
pub use sharding::{ShardRing, ShardedPool};
