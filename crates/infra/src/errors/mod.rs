//! Conversions from infrastructure errors into cache errors.

mod conversions;

pub use conversions::{classify_redis_error, map_pool_error};
