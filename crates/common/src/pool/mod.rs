//! Connection pooling primitives for remote stores
//!
//! This module provides generic pooling infrastructure on top of r2d2. Every
//! pooled connection carries a "broken" flag so callers can discard a
//! connection that faulted mid-operation instead of returning it to the idle
//! set. The store-specific connection managers live in the infrastructure
//! crate; this module knows nothing about the wire protocol.

pub mod config;
pub mod error;
pub mod metrics;
pub mod store_pool;
pub mod tracked;
pub mod types;

// Re-export commonly used types
pub use config::PoolConfig;
pub use error::{PoolError, PoolResult};
pub use metrics::PoolMetrics;
pub use store_pool::{PooledStore, StorePool};
pub use tracked::{TrackedConnection, TrackedManager};
pub use types::{HealthStatus, PoolMetricsSnapshot, PoolState};
