//! # Shardcache Core
//!
//! Cache semantics with no infrastructure dependencies.
//!
//! This crate contains:
//! - The `Cache` contract every backend implements
//! - Serializers between typed values and stored bytes
//! - The `HashStore` port over a remote hash-per-cache-name store
//! - Hash-cache operations written against that port
//! - Key building and preload hooks
//!
//! ## Architecture Principles
//! - Only depends on `shardcache-domain`
//! - No network, pool, or store client code
//! - All store access goes through the `HashStore` trait

pub mod cache_ports;
pub mod codec;
pub mod hash_ops;
pub mod keys;
pub mod preload;
pub mod serialization;
pub mod store_ports;

// Re-export specific items to avoid ambiguity
pub use cache_ports::Cache;
pub use codec::CacheCodec;
pub use keys::cache_key;
pub use preload::{run_preloads, CachePreload};
pub use serialization::{BinarySerializer, JsonSerializer, Serializer, Utf8Serializer};
pub use store_ports::HashStore;
