//! Conversions from pool and client errors into cache errors.

use redis::RedisError;
use shardcache_common::pool::PoolError;
use shardcache_domain::{CacheError, StoreFault};

/* -------------------------------------------------------------------------- */
/* PoolError → CacheError */
/* -------------------------------------------------------------------------- */

/// Map a failed checkout to the cache error surfaced to callers
///
/// Timeouts and closed pools mean the store cannot be reached, so both
/// become `CacheError::Connectivity`.
pub fn map_pool_error(err: PoolError) -> CacheError {
    match err {
        PoolError::InvalidConfig(message) => CacheError::Configuration(message),
        PoolError::Checkout { ref endpoint, .. } => {
            CacheError::Connectivity(StoreFault::connection(endpoint.clone(), err.to_string()))
        }
        PoolError::Closed { endpoint } => {
            CacheError::Connectivity(StoreFault::connection(endpoint, "connection pool is closed"))
        }
    }
}

/* -------------------------------------------------------------------------- */
/* redis::RedisError → StoreFault */
/* -------------------------------------------------------------------------- */

/// Classify a client error raised while running `command`
///
/// Socket-level failures leave the connection unusable and become
/// `StoreFault::Connection`; anything else is the server rejecting the
/// command on a healthy connection.
pub fn classify_redis_error(endpoint: &str, command: &str, err: &RedisError) -> StoreFault {
    if err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
    {
        StoreFault::connection(endpoint, format!("{command}: {err}"))
    } else {
        StoreFault::command(command, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::time::Duration;

    use redis::ErrorKind;

    use super::*;

    #[test]
    fn checkout_timeout_is_connectivity() {
        let err = map_pool_error(PoolError::Checkout {
            endpoint: "10.0.0.1:6379".to_string(),
            timeout: Duration::from_millis(100),
            message: "timed out waiting for connection".to_string(),
        });

        assert!(err.is_connectivity());
        match err.fault() {
            Some(StoreFault::Connection { endpoint, .. }) => assert_eq!(endpoint, "10.0.0.1:6379"),
            other => panic!("Expected connection fault, got {other:?}"),
        }
    }

    #[test]
    fn closed_pool_is_connectivity() {
        let err = map_pool_error(PoolError::Closed { endpoint: "10.0.0.1:6379".to_string() });
        assert!(err.is_connectivity());
    }

    #[test]
    fn invalid_config_is_configuration() {
        let err = map_pool_error(PoolError::InvalidConfig("max_size must be greater than 0".into()));
        assert!(matches!(err, CacheError::Configuration(_)));
    }

    #[test]
    fn io_errors_break_the_connection() {
        let err = RedisError::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
        let fault = classify_redis_error("10.0.0.1:6379", "HGET", &err);

        assert!(fault.is_broken());
    }

    #[test]
    fn server_errors_keep_the_connection() {
        let err = RedisError::from((ErrorKind::TypeError, "WRONGTYPE", "not a hash".to_string()));
        let fault = classify_redis_error("10.0.0.1:6379", "HGET", &err);

        assert!(!fault.is_broken());
        assert!(matches!(fault, StoreFault::Command { ref command, .. } if command == "HGET"));
    }
}
