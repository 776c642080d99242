//! Integration tests for `shardcache_common::error`.
//!
//! These suites validate that layer-specific errors can be classified and
//! ranked through the shared trait, the way callers consume them.

use std::fmt;
use std::time::Duration;

use shardcache_common::error::{ErrorClassification, ErrorSeverity};

/// Error shaped like a downstream layer's enum
#[derive(Debug)]
enum ShardError {
    Busy { retry_in: Duration },
    Unreachable(String),
    RingCorrupted,
}

impl fmt::Display for ShardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy { retry_in } => write!(f, "shard busy, retry in {retry_in:?}"),
            Self::Unreachable(endpoint) => write!(f, "shard {endpoint} unreachable"),
            Self::RingCorrupted => f.write_str("shard ring corrupted"),
        }
    }
}

impl ErrorClassification for ShardError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::RingCorrupted)
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Busy { .. } => ErrorSeverity::Warning,
            Self::Unreachable(_) => ErrorSeverity::Error,
            Self::RingCorrupted => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::RingCorrupted)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Busy { retry_in } => Some(*retry_in),
            _ => None,
        }
    }
}

/// Validates that classification surfaces the expected retryable, severity,
/// and criticality combinations for each variant.
///
/// Assertions:
/// - Confirms `err.is_retryable()` equals `retryable`.
/// - Confirms `err.severity()` equals `severity`.
/// - Confirms `err.is_critical()` equals `critical`.
#[test]
fn classification_matrix_matches_expected_contract() {
    let cases = vec![
        (ShardError::Busy { retry_in: Duration::from_millis(20) }, true, ErrorSeverity::Warning, false),
        (ShardError::Unreachable("10.0.0.2:6379".to_string()), true, ErrorSeverity::Error, false),
        (ShardError::RingCorrupted, false, ErrorSeverity::Critical, true),
    ];

    for (err, retryable, severity, critical) in cases {
        assert_eq!(err.is_retryable(), retryable, "retryable mismatch for {err}");
        assert_eq!(err.severity(), severity, "severity mismatch for {err}");
        assert_eq!(err.is_critical(), critical, "critical mismatch for {err}");
    }
}

/// Validates ranking errors from different sources through trait objects.
///
/// Assertions:
/// - Ensures the most severe error is chosen.
/// - Ensures the retry hint survives dynamic dispatch.
#[test]
fn trait_objects_rank_by_severity() {
    let busy = ShardError::Busy { retry_in: Duration::from_millis(50) };
    let unreachable = ShardError::Unreachable("10.0.0.3:6379".to_string());
    let errors: Vec<&dyn ErrorClassification> = vec![&busy, &unreachable];

    let worst = errors.iter().map(|e| e.severity()).max();
    assert_eq!(worst, Some(ErrorSeverity::Error));
    assert_eq!(errors[0].retry_after(), Some(Duration::from_millis(50)));
    assert_eq!(errors[1].retry_after(), None);
}
