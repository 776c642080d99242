//! Connection pool configuration

use std::time::Duration;

use super::error::{PoolError, PoolResult};

/// Default upper bound on pooled connections per endpoint
pub const DEFAULT_MAX_SIZE: u32 = 200;

/// Default time to wait for a connection before giving up
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection pool configuration
///
/// Maps onto the r2d2 builder. `min_idle` defaults to zero so a pool never
/// opens a connection before the first borrow, and a discarded connection
/// is only replaced when a caller needs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of connections (idle plus in use) held by the pool
    pub max_size: u32,

    /// Number of idle connections the pool keeps warm (None = max_size)
    pub min_idle: Option<u32>,

    /// Validate an idle connection before handing it out
    pub test_on_borrow: bool,

    /// Time to wait for a connection before a checkout fails
    pub connection_timeout: Duration,

    /// Close idle connections after this long (None = never)
    pub idle_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            min_idle: Some(0),
            test_on_borrow: true,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            idle_timeout: None,
        }
    }
}

impl PoolConfig {
    /// Validate the configuration
    ///
    /// # Errors
    /// Returns `PoolError::InvalidConfig` if any value is out of range.
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_size == 0 {
            return Err(PoolError::InvalidConfig("max_size must be greater than 0".to_string()));
        }
        if let Some(min_idle) = self.min_idle {
            if min_idle > self.max_size {
                return Err(PoolError::InvalidConfig(format!(
                    "min_idle ({}) cannot exceed max_size ({})",
                    min_idle, self.max_size
                )));
            }
        }
        if self.connection_timeout.is_zero() {
            return Err(PoolError::InvalidConfig(
                "connection_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the maximum pool size
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the checkout timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Enable or disable validation on borrow
    pub fn with_test_on_borrow(mut self, enabled: bool) -> Self {
        self.test_on_borrow = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for pool::config.
    use super::*;

    /// Tests the default configuration values for the pool.
    ///
    /// Verifies the pool is lazy and validates connections on borrow.
    #[test]
    fn test_default_config() {
        let config = PoolConfig::default();

        assert_eq!(config.max_size, 200, "Default pool size should be 200");
        assert_eq!(config.min_idle, Some(0), "Pool should not pre-open connections");
        assert!(config.test_on_borrow, "Connections should be tested on borrow");
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let config = PoolConfig::default().with_max_size(0);
        assert!(matches!(config.validate(), Err(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn test_min_idle_above_max_rejected() {
        let config = PoolConfig { min_idle: Some(5), ..PoolConfig::default().with_max_size(2) };
        assert!(matches!(config.validate(), Err(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = PoolConfig::default().with_connection_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(PoolError::InvalidConfig(_))));
    }
}
