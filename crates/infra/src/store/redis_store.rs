//! Redis connections for the store pool
//!
//! [`RedisConnectionManager`] opens blocking connections with connect, read
//! and write timeouts applied, and [`RedisConnection`] runs the hash
//! commands of [`HashStore`] on one of them.

use std::fmt;
use std::time::Duration;

use r2d2::ManageConnection;
use redis::{Client, ConnectionLike, RedisError};
use shardcache_core::HashStore;
use shardcache_domain::{CacheError, CacheResult, Endpoint, StoreFault};
use tracing::debug;

use crate::errors::classify_redis_error;

/// Opens connections to one Redis endpoint
pub struct RedisConnectionManager {
    client: Client,
    endpoint: String,
    socket_timeout: Duration,
}

impl RedisConnectionManager {
    /// Create a manager for `endpoint`
    ///
    /// No connection is opened here.
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` if the connection URL is rejected.
    pub fn new(endpoint: &Endpoint, password: Option<&str>, socket_timeout: Duration) -> CacheResult<Self> {
        let url = connection_url(endpoint, password);
        let client = Client::open(url.as_str()).map_err(|e| {
            CacheError::config(format!("invalid store endpoint '{}': {}", endpoint, e))
        })?;

        Ok(Self { client, endpoint: endpoint.to_string(), socket_timeout })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for RedisConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConnectionManager")
            .field("endpoint", &self.endpoint)
            .field("socket_timeout", &self.socket_timeout)
            .finish()
    }
}

/// `redis://[:password@]host:port/`, bracketing IPv6 hosts
fn connection_url(endpoint: &Endpoint, password: Option<&str>) -> String {
    let host = if endpoint.host.contains(':') {
        format!("[{}]", endpoint.host)
    } else {
        endpoint.host.clone()
    };

    match password {
        Some(password) => {
            format!("redis://:{}@{}:{}/", urlencoding::encode(password), host, endpoint.port)
        }
        None => format!("redis://{}:{}/", host, endpoint.port),
    }
}

impl ManageConnection for RedisConnectionManager {
    type Connection = RedisConnection;
    type Error = RedisError;

    fn connect(&self) -> Result<RedisConnection, RedisError> {
        let conn = self.client.get_connection_with_timeout(self.socket_timeout)?;
        conn.set_read_timeout(Some(self.socket_timeout))?;
        conn.set_write_timeout(Some(self.socket_timeout))?;
        debug!(endpoint = %self.endpoint, "Opened store connection");

        Ok(RedisConnection { conn, endpoint: self.endpoint.clone() })
    }

    fn is_valid(&self, conn: &mut RedisConnection) -> Result<(), RedisError> {
        redis::cmd("PING").query::<String>(&mut conn.conn).map(|_| ())
    }

    fn has_broken(&self, conn: &mut RedisConnection) -> bool {
        !conn.conn.is_open()
    }
}

/// One open Redis connection
pub struct RedisConnection {
    conn: redis::Connection,
    endpoint: String,
}

impl RedisConnection {
    fn run<T: redis::FromRedisValue>(&mut self, command: &'static str, cmd: &redis::Cmd) -> Result<T, StoreFault> {
        cmd.query(&mut self.conn).map_err(|e| classify_redis_error(&self.endpoint, command, &e))
    }
}

impl fmt::Debug for RedisConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConnection").field("endpoint", &self.endpoint).finish()
    }
}

impl HashStore for RedisConnection {
    fn hget(&mut self, name: &str, field: &[u8]) -> Result<Option<Vec<u8>>, StoreFault> {
        self.run("HGET", redis::cmd("HGET").arg(name).arg(field))
    }

    fn hset(&mut self, name: &str, field: &[u8], value: &[u8]) -> Result<(), StoreFault> {
        self.run::<i64>("HSET", redis::cmd("HSET").arg(name).arg(field).arg(value)).map(|_| ())
    }

    fn hdel(&mut self, name: &str, field: &[u8]) -> Result<u64, StoreFault> {
        self.run("HDEL", redis::cmd("HDEL").arg(name).arg(field))
    }

    fn expire(&mut self, name: &str, seconds: i64) -> Result<bool, StoreFault> {
        self.run("EXPIRE", redis::cmd("EXPIRE").arg(name).arg(seconds))
    }

    fn del(&mut self, name: &str) -> Result<bool, StoreFault> {
        self.run::<u64>("DEL", redis::cmd("DEL").arg(name)).map(|removed| removed > 0)
    }

    fn hlen(&mut self, name: &str) -> Result<usize, StoreFault> {
        self.run("HLEN", redis::cmd("HLEN").arg(name))
    }

    fn hkeys(&mut self, name: &str) -> Result<Vec<Vec<u8>>, StoreFault> {
        self.run("HKEYS", redis::cmd("HKEYS").arg(name))
    }

    fn hvals(&mut self, name: &str) -> Result<Vec<Vec<u8>>, StoreFault> {
        self.run("HVALS", redis::cmd("HVALS").arg(name))
    }
}
