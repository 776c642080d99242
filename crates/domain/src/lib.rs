//! # Shardcache Domain
//!
//! Domain types shared by every shardcache crate.
//!
//! This crate contains:
//! - Cache error types and the `CacheResult` alias
//! - Manager configuration and endpoint parsing
//! - Store layout constants (sentinels, expiry, defaults)
//!
//! ## Architecture
//! - Depends only on the foundation tier of `shardcache-common`
//! - No I/O, no pools, no store clients

pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
