//! Integration tests for the pooled cache backends
//!
//! Runs the manager, pools and cache handles end to end against the
//! in-process hash store, including connection faults.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use shardcache_common::error::ErrorClassification;
use shardcache_common::pool::PoolState;
use shardcache_core::{Cache, CacheCodec, Utf8Serializer};
use shardcache_domain::constants::NIL_SENTINEL;
use shardcache_domain::{CacheError, CacheManagerConfig, CacheResult, PoolSettings, StoreFault};
use shardcache_infra::store::MemoryStoreManager;
use shardcache_infra::MemoryStore;
use shardcache_infra::CacheHandle;
use support::UserProfile;

const ENDPOINT: &str = "127.0.0.1:6379";

/// Validates the user-profile scenario on a single endpoint.
///
/// Assertions:
/// - Confirms `get` returns what `put` wrote.
/// - Confirms `size` follows put and remove.
/// - Confirms `remove` returns the removed value and later reads miss.
#[test]
fn user_profile_round_trip() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let users = manager.get_typed_cache::<String, UserProfile>("users").unwrap();
    let key = "user:42".to_string();

    users.put(&key, UserProfile::named("a")).unwrap();
    assert_eq!(users.get(&key).unwrap(), Some(UserProfile::named("a")));
    assert_eq!(users.size().unwrap(), 1);

    assert_eq!(users.remove(&key).unwrap(), Some(UserProfile::named("a")));
    assert_eq!(users.get(&key).unwrap(), None);
    assert_eq!(users.size().unwrap(), 0);
}

#[test]
fn binary_cache_round_trip() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let scores = manager.get_cache::<(String, u32), Vec<f64>>("scores").unwrap();
    let key = ("level".to_string(), 3);

    scores.put(&key, vec![1.5, 2.25]).unwrap();

    assert_eq!(scores.get(&key).unwrap(), Some(vec![1.5, 2.25]));
    assert_eq!(scores.keys().unwrap().into_iter().collect::<Vec<_>>(), vec![key]);
}

#[test]
fn never_written_key_is_a_miss() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let users = manager.get_typed_cache::<String, UserProfile>("users").unwrap();

    assert_eq!(users.get(&"user:0".to_string()).unwrap(), None);
    assert_eq!(users.remove(&"user:0".to_string()).unwrap(), None);
    assert_eq!(users.size().unwrap(), 0);
}

/// Validates the expiry shared by one cache name.
///
/// Assertions:
/// - Confirms the first write already sets the expiry.
/// - Confirms `clear` drops the hash and its expiry.
#[test]
fn put_refreshes_expiry_and_clear_drops_hash() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let store = support::store_at(&manager, ENDPOINT);
    let sessions = manager.get_typed_cache::<String, u64>("sessions").unwrap();

    sessions.put(&"s1".to_string(), 1).unwrap();
    let ttl = store.ttl("sessions").expect("first put should set an expiry");
    assert!(ttl <= Duration::from_secs(60) && ttl > Duration::from_secs(50));

    sessions.put(&"s2".to_string(), 2).unwrap();
    sessions.clear().unwrap();
    assert!(!store.contains("sessions"));
    assert_eq!(store.ttl("sessions"), None);
}

#[test]
fn nil_sentinel_is_skipped() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let store = support::store_at(&manager, ENDPOINT);
    let users = manager.get_typed_cache::<String, UserProfile>("users").unwrap();

    users.put(&"user:1".to_string(), UserProfile::named("b")).unwrap();
    {
        use r2d2::ManageConnection;
        use shardcache_core::HashStore;

        let mut conn = MemoryStoreManager::new(store.clone(), ENDPOINT).connect().unwrap();
        conn.hset("users", b"\"user:2\"", NIL_SENTINEL).unwrap();
    }

    assert_eq!(users.size().unwrap(), 2);
    assert_eq!(users.get(&"user:2".to_string()).unwrap(), None);
    assert_eq!(users.values().unwrap(), vec![UserProfile::named("b")]);
}

/// Run `op` against a store faulted by `fault` and check the connection is discarded.
///
/// Assertions:
/// - Ensures the operation fails with a retryable `Connectivity` error.
/// - Confirms the pool holds no connection afterwards.
/// - Confirms the next operation after recovery opens a fresh connection.
fn assert_fault_discards_connection<F, O>(fault: F, op: O)
where
    F: Fn(&MemoryStore, bool),
    O: Fn(&CacheHandle<String, UserProfile, MemoryStoreManager>, &String) -> CacheResult<()>,
{
    let pool = PoolSettings { test_on_borrow: false, ..support::small_pool() };
    let manager = support::memory_manager_with_pool(CacheManagerConfig::default(), pool);
    let store = support::store_at(&manager, ENDPOINT);
    let users = manager.get_typed_cache::<String, UserProfile>("users").unwrap();
    let key = "user:42".to_string();

    users.put(&key, UserProfile::named("a")).unwrap();
    assert_eq!(store.connections_opened(), 1);

    fault(&store, true);
    let err = op(&users, &key).unwrap_err();
    assert!(err.is_connectivity(), "got {err:?}");
    assert!(err.is_retryable());

    let metrics = manager.metrics().unwrap();
    assert_eq!(metrics[ENDPOINT].connections_discarded, 1);
    assert_eq!(pool_state(&users).connections, 0, "faulted connection must leave the pool");

    fault(&store, false);
    assert_eq!(users.get(&key).unwrap(), Some(UserProfile::named("a")));
    assert_eq!(store.connections_opened(), 2);
}

fn drop_all(store: &MemoryStore, on: bool) {
    store.drop_connections(on);
}

#[test]
fn dropped_connection_during_get_is_discarded() {
    assert_fault_discards_connection(drop_all, |users, key| users.get(key).map(drop));
}

#[test]
fn dropped_connection_during_put_is_discarded() {
    assert_fault_discards_connection(drop_all, |users, key| users.put(key, UserProfile::named("b")).map(drop));
}

#[test]
fn dropped_connection_during_remove_is_discarded() {
    assert_fault_discards_connection(drop_all, |users, key| users.remove(key).map(drop));
}

/// Validates a fault between the lookup and the delete of `remove`.
///
/// Assertions:
/// - Confirms `HGET` succeeds and `HDEL` fails on the same borrowed connection.
/// - Confirms the entry survives the failed delete.
#[test]
fn remove_faulting_at_delete_discards_connection() {
    assert_fault_discards_connection(
        |store, on| store.drop_on(on.then_some("HDEL")),
        |users, key| users.remove(key).map(drop),
    );
}

/// Validates that server-side errors keep the connection.
///
/// Assertions:
/// - Ensures a rejected command raises `CacheError::Store`.
/// - Confirms nothing is discarded.
#[test]
fn rejected_command_keeps_connection() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let store = support::store_at(&manager, ENDPOINT);
    let users = manager.get_typed_cache::<String, UserProfile>("users").unwrap();

    store.reject_commands(true);
    let err = users.size().unwrap_err();
    assert!(matches!(err, CacheError::Store(StoreFault::Command { ref command, .. }) if command == "HLEN"));
    assert!(!err.is_retryable());
    store.reject_commands(false);

    assert_eq!(users.size().unwrap(), 0);
    assert_eq!(manager.metrics().unwrap()[ENDPOINT].connections_discarded, 0);
    assert_eq!(store.connections_opened(), 1);
}

#[test]
fn foreign_payload_is_a_serialization_error() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let counters = manager.get_typed_cache::<String, u64>("shared").unwrap();
    let names = manager.get_typed_cache::<String, String>("shared").unwrap();

    counters.put(&"k".to_string(), 7).unwrap();
    let err = names.get(&"k".to_string()).unwrap_err();

    assert!(matches!(err, CacheError::Serialization(_)), "got {err:?}");
    assert_eq!(manager.metrics().unwrap()[ENDPOINT].connections_discarded, 0);
}

#[test]
fn unreachable_endpoint_fails_with_connectivity() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let store = support::store_at(&manager, ENDPOINT);
    let users = manager.get_typed_cache::<String, UserProfile>("users").unwrap();

    store.refuse_connections(true);
    let err = users.put(&"user:1".to_string(), UserProfile::named("c")).unwrap_err();

    match err {
        CacheError::Connectivity(StoreFault::Connection { endpoint, .. }) => assert_eq!(endpoint, ENDPOINT),
        other => panic!("Expected connectivity error, got {other:?}"),
    }
    assert!(!manager.health_check().unwrap()[ENDPOINT].healthy);
}

/// Validates that empty strings are ordinary keys and values.
///
/// Assertions:
/// - Confirms an empty value reads back as `Some("")`.
/// - Confirms an empty key is listed by `keys()` and counted by `size()`.
#[test]
fn empty_strings_round_trip_with_utf8_codec() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let codec = CacheCodec::<String, String>::new(Arc::new(Utf8Serializer), Arc::new(Utf8Serializer));
    let labels = manager.get_cache_with_codec("labels", codec).unwrap();

    labels.put(&"k".to_string(), String::new()).unwrap();
    assert_eq!(labels.get(&"k".to_string()).unwrap().as_deref(), Some(""));

    labels.put(&String::new(), "blank".to_string()).unwrap();
    assert_eq!(labels.size().unwrap(), 2);
    assert_eq!(labels.keys().unwrap(), HashSet::from(["k".to_string(), String::new()]));
    assert_eq!(labels.remove(&String::new()).unwrap().as_deref(), Some("blank"));
}

#[test]
fn destroyed_manager_refuses_old_handles() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let users = manager.get_typed_cache::<String, UserProfile>("users").unwrap();
    users.put(&"user:1".to_string(), UserProfile::named("d")).unwrap();

    manager.destroy();

    assert!(users.get(&"user:1".to_string()).unwrap_err().is_connectivity());
}

/// Validates when idle connections are closed after `destroy`.
///
/// Assertions:
/// - Confirms a surviving handle keeps the idle connection open.
/// - Confirms dropping the last handle closes it.
#[test]
fn destroy_closes_connections_with_last_handle() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let store = support::store_at(&manager, ENDPOINT);
    let users = manager.get_typed_cache::<String, UserProfile>("users").unwrap();
    users.put(&"user:1".to_string(), UserProfile::named("d")).unwrap();

    manager.destroy();
    assert_eq!(store.connections_closed(), 0);

    drop(users);
    assert_eq!(store.connections_closed(), store.connections_opened());
}

/// Validates concurrent use of one handle.
///
/// Assertions:
/// - Confirms every write from eight threads is visible.
/// - Confirms the pool never opens more than its maximum.
#[test]
fn concurrent_writers_share_one_pool() {
    let manager = support::memory_manager(CacheManagerConfig::default());
    let store = support::store_at(&manager, ENDPOINT);
    let counters = manager.get_typed_cache::<String, u64>("counters").unwrap();

    std::thread::scope(|scope| {
        for thread in 0..8u64 {
            let counters = &counters;
            scope.spawn(move || {
                for i in 0..25u64 {
                    let key = format!("t{thread}-{i}");
                    counters.put(&key, thread * 100 + i).unwrap();
                    assert_eq!(counters.get(&key).unwrap(), Some(thread * 100 + i));
                }
            });
        }
    });

    assert_eq!(counters.size().unwrap(), 200);
    assert!(store.connections_opened() <= u64::from(support::small_pool().max_size));
}

/// Connection counts of the pool behind a single-endpoint handle
fn pool_state<K, V>(handle: &CacheHandle<K, V, MemoryStoreManager>) -> PoolState {
    match handle {
        CacheHandle::Single(cache) => cache.pool().state(),
        CacheHandle::Sharded(_) => panic!("Expected a single-endpoint handle"),
    }
}
