//! Store layout constants
//!
//! Centralized location for the reserved byte sequences and defaults used
//! by every cache backend.

// Reserved payloads
/// Stored value meaning "explicitly absent"; reads treat it as no value
pub const NIL_SENTINEL: &[u8] = b"nil";
/// Encoding of a missing value produced by the structured-text serializer
pub const EMPTY_SENTINEL: &[u8] = &[];

// Freshness
/// Expiry applied to a whole cache name on every write
pub const CACHE_EXPIRE_SECS: i64 = 60;

// Endpoints
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;
pub const SHARD_SEPARATOR: char = ';';

// Pool sizing
pub const DEFAULT_POOL_MAX_SIZE: u32 = 200;
pub const DEFAULT_CHECKOUT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 100_000;

// Sharding
/// Points each shard places on the consistent-hash ring
pub const VIRTUAL_NODES_PER_SHARD: usize = 160;

// Keys
pub const KEY_SEPARATOR: char = '.';
