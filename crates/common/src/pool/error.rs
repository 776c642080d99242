//! Pool error types

use std::time::Duration;

use thiserror::Error;

use crate::error::{ErrorClassification, ErrorSeverity};

/// Pool error type
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Timed out after {timeout:?} waiting for a connection to {endpoint}: {message}")]
    Checkout { endpoint: String, timeout: Duration, message: String },

    #[error("Connection pool for {endpoint} is closed")]
    Closed { endpoint: String },

    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),
}

/// Pool result type
pub type PoolResult<T> = Result<T, PoolError>;

impl PoolError {
    /// Endpoint the failing pool was bound to, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Checkout { endpoint, .. } | Self::Closed { endpoint } => Some(endpoint),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl ErrorClassification for PoolError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Checkout { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Checkout { .. } => ErrorSeverity::Warning,
            Self::Closed { .. } => ErrorSeverity::Error,
            Self::InvalidConfig(_) => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}
