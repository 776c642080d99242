//! Serializers between typed values and stored bytes
//!
//! Every cache handle carries one serializer for keys and one for values.
//! A serializer accepts `None` so "no value" has an encoding of its own;
//! decoding that encoding gives `None` back.

mod binary;
mod json;
mod utf8;

pub use binary::BinarySerializer;
pub use json::JsonSerializer;
use shardcache_domain::SerializationError;
pub use utf8::Utf8Serializer;

/// Converts values of `T` to bytes and display strings and back
pub trait Serializer<T>: Send + Sync {
    /// Encode `value`; `None` has a reserved encoding
    fn serialize(&self, value: Option<&T>) -> Result<Vec<u8>, SerializationError>;

    /// Decode bytes written by [`Serializer::serialize`]
    fn deserialize(&self, bytes: &[u8]) -> Result<Option<T>, SerializationError>;

    /// Encode `value` as text, `None` when there is no value
    fn serialize_to_string(&self, value: Option<&T>) -> Result<Option<String>, SerializationError>;

    /// Decode text written by [`Serializer::serialize_to_string`]
    fn deserialize_from_string(&self, text: &str) -> Result<Option<T>, SerializationError>;
}
