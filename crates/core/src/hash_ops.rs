//! Cache operations over the hash-per-cache-name layout
//!
//! Each cache name is one hash in the store; fields are serialized keys and
//! values are serialized values. These functions run on a connection the
//! caller already holds, so a backend borrows once per logical operation
//! (including the lookup inside [`remove`]) and decides afterwards whether
//! the connection goes back to its pool.

use std::collections::HashSet;
use std::hash::Hash;

use shardcache_domain::constants::{CACHE_EXPIRE_SECS, NIL_SENTINEL};
use shardcache_domain::CacheResult;
use tracing::debug;

use crate::codec::CacheCodec;
use crate::store_ports::HashStore;

/// Read the value stored under `key`
pub fn get<K, V, S>(store: &mut S, name: &str, codec: &CacheCodec<K, V>, key: &K) -> CacheResult<Option<V>>
where
    S: HashStore + ?Sized,
{
    let field = codec.encode_key(key)?;
    match store.hget(name, &field)? {
        Some(bytes) => Ok(codec.decode_value(&bytes)?),
        None => {
            debug!(cache = name, "Cache miss");
            Ok(None)
        }
    }
}

/// Write `value` under `key` and refresh the expiry of the whole cache
///
/// Key and value are encoded before the store is touched, so a codec
/// failure leaves the cache unchanged.
pub fn put<K, V, S>(store: &mut S, name: &str, codec: &CacheCodec<K, V>, key: &K, value: V) -> CacheResult<V>
where
    S: HashStore + ?Sized,
{
    let field = codec.encode_key(key)?;
    let bytes = codec.encode_value(&value)?;
    store.hset(name, &field, &bytes)?;
    store.expire(name, CACHE_EXPIRE_SECS)?;
    Ok(value)
}

/// Delete `key` and return the value it held
///
/// Lookup and delete are two commands; a concurrent write between them is
/// deleted without being returned.
pub fn remove<K, V, S>(store: &mut S, name: &str, codec: &CacheCodec<K, V>, key: &K) -> CacheResult<Option<V>>
where
    S: HashStore + ?Sized,
{
    let previous = get(store, name, codec, key)?;
    let field = codec.encode_key(key)?;
    let removed = store.hdel(name, &field)?;
    debug!(cache = name, removed, "Cache field removed");
    Ok(previous)
}

/// Drop the whole cache
pub fn clear<S>(store: &mut S, name: &str) -> CacheResult<()>
where
    S: HashStore + ?Sized,
{
    store.del(name)?;
    Ok(())
}

pub fn size<S>(store: &mut S, name: &str) -> CacheResult<usize>
where
    S: HashStore + ?Sized,
{
    Ok(store.hlen(name)?)
}

/// All keys of the cache, decoded in one round-trip
pub fn keys<K, V, S>(store: &mut S, name: &str, codec: &CacheCodec<K, V>) -> CacheResult<HashSet<K>>
where
    K: Eq + Hash,
    S: HashStore + ?Sized,
{
    let mut keys = HashSet::new();
    for field in store.hkeys(name)? {
        if let Some(key) = codec.decode_key(&field)? {
            keys.insert(key);
        }
    }
    Ok(keys)
}

/// All values of the cache, decoded in one round-trip
///
/// Entries holding the `nil` sentinel are skipped.
pub fn values<K, V, S>(store: &mut S, name: &str, codec: &CacheCodec<K, V>) -> CacheResult<Vec<V>>
where
    S: HashStore + ?Sized,
{
    let raw = store.hvals(name)?;
    let mut values = Vec::with_capacity(raw.len());
    for bytes in raw.iter().filter(|b| b.as_slice() != NIL_SENTINEL) {
        if let Some(value) = codec.decode_value(bytes)? {
            values.push(value);
        }
    }
    Ok(values)
}
