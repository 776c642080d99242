//! Plain UTF-8 string serializer

use shardcache_domain::constants::NIL_SENTINEL;
use shardcache_domain::SerializationError;

use super::Serializer;

/// Stores `String` values as their raw UTF-8 bytes
///
/// `None` encodes as the `nil` sentinel. Empty bytes are the empty string,
/// which is a valid key and value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Serializer;

impl Serializer<String> for Utf8Serializer {
    fn serialize(&self, value: Option<&String>) -> Result<Vec<u8>, SerializationError> {
        Ok(value.map_or_else(|| NIL_SENTINEL.to_vec(), |s| s.as_bytes().to_vec()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Option<String>, SerializationError> {
        if bytes == NIL_SENTINEL {
            return Ok(None);
        }
        String::from_utf8(bytes.to_vec()).map(Some).map_err(|e| SerializationError::Decode {
            format: "UTF-8",
            type_name: "alloc::string::String",
            message: e.to_string(),
        })
    }

    fn serialize_to_string(&self, value: Option<&String>) -> Result<Option<String>, SerializationError> {
        Ok(value.cloned())
    }

    fn deserialize_from_string(&self, text: &str) -> Result<Option<String>, SerializationError> {
        Ok(Some(text.to_string()))
    }
}
