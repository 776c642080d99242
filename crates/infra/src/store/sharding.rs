//! Consistent-hash routing across shard pools
//!
//! Every shard places [`VIRTUAL_NODES_PER_SHARD`] points on a 64-bit ring.
//! A key is routed to the first point at or after its own hash, wrapping
//! around at the end of the ring. Routing depends only on the number of
//! shards, so every process configured with the same shard list agrees.
//!
//! Points are named `SHARD-{i}-NODE-{n}` like Jedis rings but hashed with
//! blake3 rather than MurmurHash64A, so a cache name does not land on the
//! same shard as it would under a Jedis client sharing the servers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use r2d2::ManageConnection;
use shardcache_common::pool::StorePool;
use shardcache_domain::constants::VIRTUAL_NODES_PER_SHARD;
use shardcache_domain::{CacheError, CacheResult};
use tracing::info;

/// 64-bit ring position of `bytes`
fn ring_hash(bytes: &[u8]) -> u64 {
    let digest = blake3::hash(bytes);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

/// Ring of virtual nodes mapping keys to shard indexes
#[derive(Debug, Clone)]
pub struct ShardRing {
    nodes: BTreeMap<u64, usize>,
    shards: usize,
}

impl ShardRing {
    /// Build the ring for `shards` shards
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` when `shards` is zero.
    pub fn new(shards: usize) -> CacheResult<Self> {
        if shards == 0 {
            return Err(CacheError::config("shard ring needs at least one shard"));
        }

        let mut nodes = BTreeMap::new();
        for shard in 0..shards {
            for node in 0..VIRTUAL_NODES_PER_SHARD {
                nodes.insert(ring_hash(format!("SHARD-{shard}-NODE-{node}").as_bytes()), shard);
            }
        }

        Ok(Self { nodes, shards })
    }

    /// Shard owning `key`
    pub fn shard_for(&self, key: &[u8]) -> usize {
        let hash = ring_hash(key);
        self.nodes
            .range(hash..)
            .next()
            .or_else(|| self.nodes.iter().next())
            .map_or(0, |(_, shard)| *shard)
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }
}

/// One pool per shard plus the ring choosing between them
pub struct ShardedPool<M: ManageConnection> {
    pools: Vec<Arc<StorePool<M>>>,
    ring: ShardRing,
}

impl<M: ManageConnection> ShardedPool<M> {
    /// Route over `pools`, in shard order
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` when `pools` is empty.
    pub fn new(pools: Vec<Arc<StorePool<M>>>) -> CacheResult<Self> {
        let ring = ShardRing::new(pools.len())?;
        info!(shards = pools.len(), "Sharded store pool created");
        Ok(Self { pools, ring })
    }

    /// Pool of the shard owning `key`
    pub fn pool_for(&self, key: &[u8]) -> &Arc<StorePool<M>> {
        &self.pools[self.ring.shard_for(key)]
    }

    pub fn shard_index(&self, key: &[u8]) -> usize {
        self.ring.shard_for(key)
    }

    pub fn pools(&self) -> &[Arc<StorePool<M>>] {
        &self.pools
    }

    /// Close every shard pool
    pub fn close(&self) {
        for pool in &self.pools {
            pool.close();
        }
    }
}

impl<M: ManageConnection> fmt::Debug for ShardedPool<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedPool")
            .field("shards", &self.pools.iter().map(|p| p.endpoint()).collect::<Vec<_>>())
            .finish()
    }
}
