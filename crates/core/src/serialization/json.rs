//! JSON serializer bound to a declared type

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shardcache_domain::constants::EMPTY_SENTINEL;
use shardcache_domain::SerializationError;

use super::Serializer;

const FORMAT: &str = "JSON";

/// Structured-text serializer for `T`
///
/// `None` encodes as the empty byte sentinel. Valid JSON is never empty, so
/// the sentinel cannot collide with an encoded value.
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }

    fn encode_error(err: serde_json::Error) -> SerializationError {
        SerializationError::Encode { format: FORMAT, type_name: type_name::<T>(), message: err.to_string() }
    }

    fn decode_error(err: serde_json::Error) -> SerializationError {
        SerializationError::Decode { format: FORMAT, type_name: type_name::<T>(), message: err.to_string() }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonSerializer<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSerializer").field("type", &type_name::<T>()).finish()
    }
}

impl<T> Serializer<T> for JsonSerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: Option<&T>) -> Result<Vec<u8>, SerializationError> {
        match value {
            None => Ok(EMPTY_SENTINEL.to_vec()),
            Some(value) => serde_json::to_vec(value).map_err(Self::encode_error),
        }
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Option<T>, SerializationError> {
        if bytes == EMPTY_SENTINEL {
            return Ok(None);
        }
        serde_json::from_slice(bytes).map(Some).map_err(Self::decode_error)
    }

    fn serialize_to_string(&self, value: Option<&T>) -> Result<Option<String>, SerializationError> {
        value.map(|v| serde_json::to_string(v).map_err(Self::encode_error)).transpose()
    }

    fn deserialize_from_string(&self, text: &str) -> Result<Option<T>, SerializationError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(text).map(Some).map_err(Self::decode_error)
    }
}
