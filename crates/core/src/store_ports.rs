//! Port for a remote store holding one hash per cache name.
//!
//! Infrastructure adapts concrete clients (Redis, the in-process test
//! store) to this trait. Every method runs exactly one command on an open
//! connection; a fault that leaves the connection unusable is reported as
//! [`StoreFault::Connection`] so the caller can discard it.

use shardcache_domain::StoreFault;

/// Hash commands on one open store connection.
pub trait HashStore {
    /// `HGET name field`
    fn hget(&mut self, name: &str, field: &[u8]) -> Result<Option<Vec<u8>>, StoreFault>;

    /// `HSET name field value`
    fn hset(&mut self, name: &str, field: &[u8], value: &[u8]) -> Result<(), StoreFault>;

    /// `HDEL name field`, returning the number of fields removed
    fn hdel(&mut self, name: &str, field: &[u8]) -> Result<u64, StoreFault>;

    /// `EXPIRE name seconds`, returning whether the hash exists
    fn expire(&mut self, name: &str, seconds: i64) -> Result<bool, StoreFault>;

    /// `DEL name`, returning whether the hash existed
    fn del(&mut self, name: &str) -> Result<bool, StoreFault>;

    /// `HLEN name`
    fn hlen(&mut self, name: &str) -> Result<usize, StoreFault>;

    /// `HKEYS name`
    fn hkeys(&mut self, name: &str) -> Result<Vec<Vec<u8>>, StoreFault>;

    /// `HVALS name`
    fn hvals(&mut self, name: &str) -> Result<Vec<Vec<u8>>, StoreFault>;
}
