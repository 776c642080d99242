//! Integration tests for sharded caches
//!
//! Every cache name must land on exactly one shard, chosen the same way by
//! every manager configured with the same shard list.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use shardcache_core::Cache;
use shardcache_domain::CacheManagerConfig;
use shardcache_infra::{CacheHandle, ShardRing};
use support::UserProfile;

const SHARDS: [&str; 3] = ["10.0.0.1:6379", "10.0.0.2:6379", "10.0.0.3:6379"];

fn sharded_config() -> CacheManagerConfig {
    CacheManagerConfig::sharded(SHARDS)
}

fn shard_of<K, V, M>(handle: &CacheHandle<K, V, M>) -> usize
where
    M: r2d2::ManageConnection,
{
    match handle {
        CacheHandle::Sharded(cache) => cache.shard_index(),
        CacheHandle::Single(_) => panic!("Expected a sharded handle"),
    }
}

/// Validates that a cache name lives on one shard.
///
/// Assertions:
/// - Confirms every entry of a cache sits on the store its ring slot names.
/// - Confirms the other stores hold nothing for that name.
#[test]
fn cache_name_selects_one_shard() {
    let manager = support::memory_manager(sharded_config());
    let ring = ShardRing::new(SHARDS.len()).unwrap();

    for name in ["users", "orders", "sessions", "carts", "prices", "stock"] {
        let cache = manager.get_typed_cache::<String, u32>(name).unwrap();
        for i in 0..5 {
            cache.put(&format!("{name}-{i}"), i).unwrap();
        }

        let owner = ring.shard_for(name.as_bytes());
        assert_eq!(shard_of(&cache), owner);
        for (index, endpoint) in SHARDS.iter().enumerate() {
            let expected = if index == owner { 5 } else { 0 };
            assert_eq!(support::store_at(&manager, endpoint).hash_len(name), expected, "{name} on {endpoint}");
        }
        assert_eq!(cache.size().unwrap(), 5);
    }
}

#[test]
fn routing_is_stable_across_managers() {
    let first = support::memory_manager(sharded_config());
    let second = support::memory_manager(sharded_config());

    for i in 0..50 {
        let name = format!("cache-{i}");
        let a = first.get_cache::<String, String>(&name).unwrap();
        let b = second.get_cache::<String, String>(&name).unwrap();
        assert_eq!(shard_of(&a), shard_of(&b));
    }
}

/// Validates the user-profile scenario on a sharded store.
///
/// Assertions:
/// - Confirms the same semantics as a single endpoint.
#[test]
fn user_profile_round_trip_sharded() {
    let manager = support::memory_manager(sharded_config());
    let users = manager.get_typed_cache::<String, UserProfile>("users").unwrap();
    let key = "user:42".to_string();

    users.put(&key, UserProfile::named("a")).unwrap();
    assert_eq!(users.get(&key).unwrap(), Some(UserProfile::named("a")));
    assert_eq!(users.size().unwrap(), 1);
    assert_eq!(users.remove(&key).unwrap(), Some(UserProfile::named("a")));
    assert_eq!(users.get(&key).unwrap(), None);
    assert_eq!(users.size().unwrap(), 0);
}

/// Validates fault isolation between shards.
///
/// Assertions:
/// - Ensures a cache on the faulted shard fails with a connectivity error.
/// - Confirms a cache on a healthy shard keeps working.
#[test]
fn faulted_shard_does_not_affect_others() {
    let manager = support::memory_manager(sharded_config());
    let ring = ShardRing::new(SHARDS.len()).unwrap();

    let names: Vec<String> = (0..100).map(|i| format!("cache-{i}")).collect();
    let on_first = names.iter().find(|n| ring.shard_for(n.as_bytes()) == 0).unwrap();
    let elsewhere = names.iter().find(|n| ring.shard_for(n.as_bytes()) != 0).unwrap();

    support::store_at(&manager, SHARDS[0]).refuse_connections(true);

    let broken = manager.get_typed_cache::<String, u32>(on_first).unwrap();
    assert!(broken.put(&"k".to_string(), 1).unwrap_err().is_connectivity());

    let healthy = manager.get_typed_cache::<String, u32>(elsewhere).unwrap();
    assert_eq!(healthy.put(&"k".to_string(), 1).unwrap(), 1);
    assert_eq!(healthy.get(&"k".to_string()).unwrap(), Some(1));
}
