//! Shared helpers for infra integration tests.

use std::sync::Once;

use serde::{Deserialize, Serialize};
use shardcache_domain::{CacheManagerConfig, Endpoint, PoolSettings};
use shardcache_infra::{MemoryConnector, MemoryStore, RedisCacheManager};

static TRACING: Once = Once::new();

/// Install a test subscriber once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("debug").try_init();
    });
}

/// Small pools with short timeouts so failure paths return quickly.
pub fn small_pool() -> PoolSettings {
    PoolSettings { max_size: 4, checkout_timeout_ms: 200, ..PoolSettings::default() }
}

/// Initialized manager over in-process stores, with [`small_pool`] sizing.
pub fn memory_manager(config: CacheManagerConfig) -> RedisCacheManager<MemoryConnector> {
    memory_manager_with_pool(config, small_pool())
}

/// Initialized manager over in-process stores.
pub fn memory_manager_with_pool(
    config: CacheManagerConfig,
    pool: PoolSettings,
) -> RedisCacheManager<MemoryConnector> {
    init_tracing();
    let manager = RedisCacheManager::with_connector(config.with_pool(pool), MemoryConnector::new());
    manager.init().expect("memory manager should initialize");
    manager
}

/// Store behind `endpoint` of a memory-backed manager.
pub fn store_at(manager: &RedisCacheManager<MemoryConnector>, endpoint: &str) -> MemoryStore {
    let endpoint = Endpoint::parse(endpoint).expect("test endpoint should parse");
    manager.connector().store_for(&endpoint)
}

/// Value type stored by the scenario tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}

impl UserProfile {
    pub fn named(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}
