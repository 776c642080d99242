//! Cache manager configuration

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CHECKOUT_TIMEOUT_MS, DEFAULT_HOST, DEFAULT_POOL_MAX_SIZE, DEFAULT_PORT,
    DEFAULT_SOCKET_TIMEOUT_MS, SHARD_SEPARATOR,
};
use crate::errors::{CacheError, CacheResult};

/// Remote cache manager configuration
///
/// `host` is a single `host[:port]` when `sharded` is false, or a
/// `;`-separated list of `host[:port]` entries (one per shard) when true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheManagerConfig {
    pub host: String,
    pub password: Option<String>,
    pub sharded: bool,
    pub pool: PoolSettings,
}

impl Default for CacheManagerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            password: None,
            sharded: false,
            pool: PoolSettings::default(),
        }
    }
}

impl CacheManagerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into(), ..Self::default() }
    }

    /// Sharded configuration over `hosts`
    pub fn sharded<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let host = hosts
            .into_iter()
            .map(|h| h.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(&SHARD_SEPARATOR.to_string());
        Self { host, sharded: true, ..Self::default() }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_pool(mut self, pool: PoolSettings) -> Self {
        self.pool = pool;
        self
    }

    /// Password to authenticate with, ignoring blank values
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Resolve the configured endpoints
    ///
    /// A blank host falls back to the default host. Entries without a port
    /// use the default port; empty entries in a shard list are skipped.
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` if an entry cannot be parsed or a
    /// sharded configuration names no endpoint.
    pub fn endpoints(&self) -> CacheResult<Vec<Endpoint>> {
        let host = self.host.trim();
        if !self.sharded {
            if host.is_empty() {
                return Ok(vec![Endpoint::new(DEFAULT_HOST, DEFAULT_PORT)]);
            }
            return Ok(vec![Endpoint::parse(host)?]);
        }

        let endpoints = host
            .split(SHARD_SEPARATOR)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Endpoint::parse)
            .collect::<CacheResult<Vec<_>>>()?;

        if endpoints.is_empty() {
            return Err(CacheError::config("sharded configuration names no endpoint"));
        }
        Ok(endpoints)
    }

    /// Validate endpoints and pool settings
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` describing the first problem.
    pub fn validate(&self) -> CacheResult<()> {
        self.endpoints()?;
        self.pool.validate()
    }
}

/// Pool sizing and timeouts applied to every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_size: u32,
    pub min_idle: Option<u32>,
    pub test_on_borrow: bool,
    /// How long a borrow waits for a connection
    pub checkout_timeout_ms: u64,
    /// Connect, read and write timeout on each connection
    pub socket_timeout_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_POOL_MAX_SIZE,
            min_idle: Some(0),
            test_on_borrow: true,
            checkout_timeout_ms: DEFAULT_CHECKOUT_TIMEOUT_MS,
            socket_timeout_ms: DEFAULT_SOCKET_TIMEOUT_MS,
        }
    }
}

impl PoolSettings {
    fn validate(&self) -> CacheResult<()> {
        if self.max_size == 0 {
            return Err(CacheError::config("pool.max_size must be greater than 0"));
        }
        if self.checkout_timeout_ms == 0 {
            return Err(CacheError::config("pool.checkout_timeout_ms must be greater than 0"));
        }
        if self.socket_timeout_ms == 0 {
            return Err(CacheError::config("pool.socket_timeout_ms must be greater than 0"));
        }
        Ok(())
    }
}

/// One `host:port` store endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// Parse `host` or `host:port`
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` on an empty host or bad port.
    pub fn parse(entry: &str) -> CacheResult<Self> {
        let entry = entry.trim();
        let (host, port) = match entry.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.trim().parse::<u16>().map_err(|e| {
                    CacheError::config(format!("invalid port in endpoint '{}': {}", entry, e))
                })?;
                (host.trim(), port)
            }
            None => (entry, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(CacheError::config(format!("endpoint '{}' has no host", entry)));
        }
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for config.
    use super::*;

    /// Validates the default configuration.
    ///
    /// Assertions:
    /// - Confirms the single endpoint is `127.0.0.1:6379`.
    /// - Confirms no password is configured.
    #[test]
    fn test_default_config() {
        let config = CacheManagerConfig::default();

        assert!(!config.sharded);
        assert_eq!(config.password(), None);
        assert_eq!(config.endpoints().unwrap(), vec![Endpoint::new("127.0.0.1", 6379)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_host_falls_back_to_default() {
        let config = CacheManagerConfig::new("   ");
        assert_eq!(config.endpoints().unwrap(), vec![Endpoint::new(DEFAULT_HOST, DEFAULT_PORT)]);
    }

    #[test]
    fn test_single_host_with_port() {
        let config = CacheManagerConfig::new("cache.internal:6380");
        assert_eq!(config.endpoints().unwrap(), vec![Endpoint::new("cache.internal", 6380)]);
    }

    /// Validates shard list parsing.
    ///
    /// Assertions:
    /// - Confirms entries keep their configured order.
    /// - Confirms empty entries are skipped and missing ports default.
    #[test]
    fn test_sharded_endpoints() {
        let config = CacheManagerConfig::sharded(["10.0.0.1:6379", "10.0.0.2:6380", "", "10.0.0.3"]);

        let endpoints = config.endpoints().unwrap();
        assert_eq!(
            endpoints,
            vec![
                Endpoint::new("10.0.0.1", 6379),
                Endpoint::new("10.0.0.2", 6380),
                Endpoint::new("10.0.0.3", 6379),
            ]
        );
        assert_eq!(endpoints[1].to_string(), "10.0.0.2:6380");
    }

    #[test]
    fn test_sharded_without_entries_is_rejected() {
        let config = CacheManagerConfig { sharded: true, host: " ; ".to_string(), ..Default::default() };
        assert!(matches!(config.endpoints(), Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Endpoint::parse("10.0.0.1:redis").unwrap_err();
        assert!(err.to_string().contains("invalid port"), "got {err}");

        assert!(Endpoint::parse(":6379").is_err());
    }

    #[test]
    fn test_blank_password_is_ignored() {
        let config = CacheManagerConfig::default().with_password("  ");
        assert_eq!(config.password(), None);

        let config = CacheManagerConfig::default().with_password("s3cret");
        assert_eq!(config.password(), Some("s3cret"));
    }

    #[test]
    fn test_zero_pool_size_is_rejected() {
        let pool = PoolSettings { max_size: 0, ..Default::default() };
        let config = CacheManagerConfig::default().with_pool(pool);
        assert!(matches!(config.validate(), Err(CacheError::Configuration(_))));
    }
}
