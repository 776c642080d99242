//! Key and value serializer pair attached to a cache handle

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shardcache_domain::constants::NIL_SENTINEL;
use shardcache_domain::SerializationError;

use crate::serialization::{BinarySerializer, JsonSerializer, Serializer};

/// Serializers for the keys and values of one cache
pub struct CacheCodec<K, V> {
    keys: Arc<dyn Serializer<K>>,
    values: Arc<dyn Serializer<V>>,
}

impl<K, V> CacheCodec<K, V> {
    pub fn new(keys: Arc<dyn Serializer<K>>, values: Arc<dyn Serializer<V>>) -> Self {
        Self { keys, values }
    }

    /// Binary serializers for both keys and values
    pub fn binary() -> Self
    where
        K: Serialize + DeserializeOwned + 'static,
        V: Serialize + DeserializeOwned + 'static,
    {
        Self::new(Arc::new(BinarySerializer::<K>::new()), Arc::new(BinarySerializer::<V>::new()))
    }

    /// JSON serializers bound to `K` and `V`
    pub fn json() -> Self
    where
        K: Serialize + DeserializeOwned + 'static,
        V: Serialize + DeserializeOwned + 'static,
    {
        Self::new(Arc::new(JsonSerializer::<K>::new()), Arc::new(JsonSerializer::<V>::new()))
    }

    pub fn encode_key(&self, key: &K) -> Result<Vec<u8>, SerializationError> {
        self.keys.serialize(Some(key))
    }

    pub fn decode_key(&self, bytes: &[u8]) -> Result<Option<K>, SerializationError> {
        self.keys.deserialize(bytes)
    }

    pub fn encode_value(&self, value: &V) -> Result<Vec<u8>, SerializationError> {
        self.values.serialize(Some(value))
    }

    /// Decode a stored value; the `nil` sentinel reads as no value
    pub fn decode_value(&self, bytes: &[u8]) -> Result<Option<V>, SerializationError> {
        if bytes == NIL_SENTINEL {
            return Ok(None);
        }
        self.values.deserialize(bytes)
    }
}

impl<K, V> Clone for CacheCodec<K, V> {
    fn clone(&self) -> Self {
        Self { keys: Arc::clone(&self.keys), values: Arc::clone(&self.values) }
    }
}

impl<K, V> fmt::Debug for CacheCodec<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheCodec")
            .field("keys", &std::any::type_name::<K>())
            .field("values", &std::any::type_name::<V>())
            .finish()
    }
}
