//! General-purpose binary serializer
//!
//! Payloads are self-describing: a magic header and a type tag precede the
//! bincode body, so reading a blob back as a different type fails with
//! `TypeMismatch` instead of producing garbage.
//!
//! The tag defaults to `std::any::type_name`, which is not guaranteed stable
//! across compiler versions and depends on the module path. Data shared
//! between separately built services should use
//! [`BinarySerializer::with_tag`].
//!
//! Layout: `SCB1` | tag length (u16 LE) | tag | bincode payload

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shardcache_domain::constants::EMPTY_SENTINEL;
use shardcache_domain::SerializationError;

use super::Serializer;

const MAGIC: &[u8; 4] = b"SCB1";
const FORMAT: &str = "binary";

/// Binary serializer for any serde type
pub struct BinarySerializer<T> {
    tag: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BinarySerializer<T> {
    /// Serializer tagging payloads with the Rust type name of `T`
    pub fn new() -> Self {
        Self::with_tag(type_name::<T>())
    }

    /// Serializer tagging payloads with `tag`
    ///
    /// Readers and writers agree on a type when their tags are equal,
    /// whatever the Rust path of `T` is on either side.
    pub fn with_tag(tag: &'static str) -> Self {
        Self { tag, _marker: PhantomData }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

impl<T> Default for BinarySerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BinarySerializer<T> {
    fn clone(&self) -> Self {
        Self::with_tag(self.tag)
    }
}

impl<T> fmt::Debug for BinarySerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinarySerializer").field("tag", &self.tag).finish()
    }
}

impl<T> BinarySerializer<T> {
    fn decode_error(message: impl Into<String>) -> SerializationError {
        SerializationError::Decode {
            format: FORMAT,
            type_name: type_name::<T>(),
            message: message.into(),
        }
    }

    /// Split an envelope into its tag and payload
    fn open_envelope(bytes: &[u8]) -> Result<(&str, &[u8]), SerializationError> {
        let rest = bytes
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| Self::decode_error("missing binary envelope header"))?;
        if rest.len() < 2 {
            return Err(Self::decode_error("truncated binary envelope"));
        }
        let name_len = u16::from_le_bytes([rest[0], rest[1]]) as usize;
        let rest = &rest[2..];
        if rest.len() < name_len {
            return Err(Self::decode_error("truncated tag in binary envelope"));
        }
        let (name, payload) = rest.split_at(name_len);
        let name = std::str::from_utf8(name)
            .map_err(|e| Self::decode_error(format!("tag is not UTF-8: {}", e)))?;
        Ok((name, payload))
    }
}

impl<T> Serializer<T> for BinarySerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: Option<&T>) -> Result<Vec<u8>, SerializationError> {
        let Some(value) = value else {
            return Ok(EMPTY_SENTINEL.to_vec());
        };

        let name = self.tag.as_bytes();
        let name_len = u16::try_from(name.len()).map_err(|_| SerializationError::Encode {
            format: FORMAT,
            type_name: type_name::<T>(),
            message: "tag too long for envelope".to_string(),
        })?;
        let payload = bincode::serialize(value).map_err(|e| SerializationError::Encode {
            format: FORMAT,
            type_name: type_name::<T>(),
            message: e.to_string(),
        })?;

        let mut bytes = Vec::with_capacity(MAGIC.len() + 2 + name.len() + payload.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&name_len.to_le_bytes());
        bytes.extend_from_slice(name);
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Option<T>, SerializationError> {
        if bytes == EMPTY_SENTINEL {
            return Ok(None);
        }

        let (found, payload) = Self::open_envelope(bytes)?;
        if found != self.tag {
            return Err(SerializationError::TypeMismatch {
                expected: self.tag.to_string(),
                found: found.to_string(),
            });
        }
        bincode::deserialize(payload).map(Some).map_err(|e| Self::decode_error(e.to_string()))
    }

    fn serialize_to_string(&self, _value: Option<&T>) -> Result<Option<String>, SerializationError> {
        Err(SerializationError::UnsupportedOperation {
            format: FORMAT,
            operation: "serialize_to_string",
        })
    }

    fn deserialize_from_string(&self, _text: &str) -> Result<Option<T>, SerializationError> {
        Err(SerializationError::UnsupportedOperation {
            format: FORMAT,
            operation: "deserialize_from_string",
        })
    }
}
