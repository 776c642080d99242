//! Error types used throughout the cache layer

use std::time::Duration;

use shardcache_common::error::{ErrorClassification, ErrorSeverity};
use thiserror::Error;

/// Fault reported by a store connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreFault {
    /// The endpoint was unreachable, or the connection dropped or timed out
    /// mid-command. The connection must not be reused.
    #[error("connection to {endpoint} failed: {message}")]
    Connection { endpoint: String, message: String },

    /// The store answered with an error; the connection itself is fine
    #[error("{command} rejected by store: {message}")]
    Command { command: String, message: String },
}

impl StoreFault {
    pub fn connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection { endpoint: endpoint.into(), message: message.into() }
    }

    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command { command: command.into(), message: message.into() }
    }

    /// Whether the connection that produced this fault must be discarded
    pub fn is_broken(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Failure converting between values and stored bytes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("cannot encode {type_name} as {format}: {message}")]
    Encode { format: &'static str, type_name: &'static str, message: String },

    #[error("cannot decode {format} payload as {type_name}: {message}")]
    Decode { format: &'static str, type_name: &'static str, message: String },

    /// The payload was written for a different type
    #[error("payload holds {found}, expected {expected}")]
    TypeMismatch { expected: String, found: String },

    #[error("{format} serializer does not support {operation}")]
    UnsupportedOperation { format: &'static str, operation: &'static str },
}

/// Main error type for cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Connectivity(#[source] StoreFault),

    #[error("cache store error: {0}")]
    Store(#[source] StoreFault),

    #[error("cache serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    #[error("cache configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

impl CacheError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// The store fault behind this error, if any
    pub fn fault(&self) -> Option<&StoreFault> {
        match self {
            Self::Connectivity(fault) | Self::Store(fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<StoreFault> for CacheError {
    fn from(fault: StoreFault) -> Self {
        if fault.is_broken() {
            Self::Connectivity(fault)
        } else {
            Self::Store(fault)
        }
    }
}

impl ErrorClassification for CacheError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Connectivity(_) => ErrorSeverity::Warning,
            Self::Store(_) | Self::Serialization(_) => ErrorSeverity::Error,
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}
