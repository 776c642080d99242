//! Error classification shared by every shardcache crate
//!
//! The error handling system is built on two pieces:
//!
//! 1. **`ErrorClassification` trait**: a standard interface for classifying
//!    errors by retryability, severity and criticality.
//!
//! 2. **`ErrorSeverity` enum**: a single severity scale used for logging
//!    decisions.
//!
//! Each layer keeps its own `thiserror` enum (`PoolError`, `CacheError`) and
//! implements `ErrorClassification` so callers can make the same decisions
//! regardless of which layer failed.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Missing entry, empty snapshot |
//! | **Warning** | Degraded but operational | Checkout timeout, store hiccup |
//! | **Error** | Failure requiring attention | Unreachable endpoint, bad config |
//! | **Critical** | Integrity at risk | Invariant violations |

use std::fmt;
use std::time::Duration;

/// Error classification trait for consistent error handling across layers
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: checkout timeouts, dropped
    /// connections, unreachable endpoints. The cache layer itself never
    /// retries; this is a hint for callers that implement their own policy.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
