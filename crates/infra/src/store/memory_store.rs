//! In-process hash store
//!
//! Implements the same hash commands as the Redis adapter on top of a
//! shared map, so the pooled backends, sharding and the manager can run
//! without a server. Faults can be injected to exercise the connectivity
//! paths: refusing new connections, dropping open ones mid-command, or
//! rejecting commands with a server-side error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::Mutex;
use r2d2::ManageConnection;
use shardcache_core::HashStore;
use shardcache_domain::StoreFault;
use thiserror::Error;

/// One hash and its expiry deadline
#[derive(Debug, Default)]
struct StoredHash {
    fields: IndexMap<Vec<u8>, Vec<u8>>,
    expires_at: Option<Instant>,
}

impl StoredHash {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

#[derive(Debug, Default)]
struct Shared {
    hashes: Mutex<HashMap<String, StoredHash>>,
    refuse_connections: AtomicBool,
    drop_connections: AtomicBool,
    reject_commands: AtomicBool,
    drop_on: Mutex<Option<&'static str>>,
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
}

/// Shared in-memory hash store
///
/// Clones share the same data and fault switches.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse new connections while `refuse` is set
    pub fn refuse_connections(&self, refuse: bool) {
        self.shared.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// Fail every command on open connections at the socket level
    pub fn drop_connections(&self, drop: bool) {
        self.shared.drop_connections.store(drop, Ordering::SeqCst);
    }

    /// Fail open connections at the socket level once they issue `command`
    ///
    /// Earlier commands on the same connection still succeed; `None` clears it.
    pub fn drop_on(&self, command: Option<&'static str>) {
        *self.shared.drop_on.lock() = command;
    }

    /// Answer every command with a server error
    pub fn reject_commands(&self, reject: bool) {
        self.shared.reject_commands.store(reject, Ordering::SeqCst);
    }

    /// Total connections opened since creation
    pub fn connections_opened(&self) -> u64 {
        self.shared.connections_opened.load(Ordering::SeqCst)
    }

    /// Total connections dropped since creation
    pub fn connections_closed(&self) -> u64 {
        self.shared.connections_closed.load(Ordering::SeqCst)
    }

    /// Whether a live hash named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.hash_len(name) > 0
    }

    /// Field count of `name`, zero when absent or expired
    pub fn hash_len(&self, name: &str) -> usize {
        self.with_hash(name, |hash| hash.map_or(0, |h| h.fields.len()))
    }

    /// Time left before `name` expires, `None` without an expiry
    pub fn ttl(&self, name: &str) -> Option<Duration> {
        self.with_hash(name, |hash| {
            hash.and_then(|h| h.expires_at).map(|deadline| deadline.saturating_duration_since(Instant::now()))
        })
    }

    /// Run `f` on the live hash `name`, purging it first if it expired
    fn with_hash<T>(&self, name: &str, f: impl FnOnce(Option<&mut StoredHash>) -> T) -> T {
        let mut hashes = self.shared.hashes.lock();
        if hashes.get(name).is_some_and(|h| h.is_expired(Instant::now())) {
            hashes.remove(name);
        }
        f(hashes.get_mut(name))
    }

    /// Run `f` on the hash `name`, creating it when absent
    fn with_hash_entry<T>(&self, name: &str, f: impl FnOnce(&mut StoredHash) -> T) -> T {
        let mut hashes = self.shared.hashes.lock();
        let now = Instant::now();
        let hash = hashes.entry(name.to_string()).or_default();
        if hash.is_expired(now) {
            *hash = StoredHash::default();
        }
        f(hash)
    }

    fn remove_hash(&self, name: &str) -> bool {
        let mut hashes = self.shared.hashes.lock();
        match hashes.remove(name) {
            Some(hash) => !hash.is_expired(Instant::now()),
            None => false,
        }
    }
}

/// Error opening or validating a memory store connection
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("connection to {endpoint} refused")]
    Refused { endpoint: String },

    #[error("connection to {endpoint} reset by peer")]
    Dropped { endpoint: String },
}

/// r2d2 manager handing out connections to a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct MemoryStoreManager {
    store: MemoryStore,
    endpoint: String,
}

impl MemoryStoreManager {
    pub fn new(store: MemoryStore, endpoint: impl Into<String>) -> Self {
        Self { store, endpoint: endpoint.into() }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl ManageConnection for MemoryStoreManager {
    type Connection = MemoryConnection;
    type Error = MemoryStoreError;

    fn connect(&self) -> Result<MemoryConnection, MemoryStoreError> {
        let shared = &self.store.shared;
        if shared.refuse_connections.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::Refused { endpoint: self.endpoint.clone() });
        }

        let id = shared.connections_opened.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MemoryConnection {
            store: self.store.clone(),
            endpoint: self.endpoint.clone(),
            id,
            broken: false,
        })
    }

    fn is_valid(&self, conn: &mut MemoryConnection) -> Result<(), MemoryStoreError> {
        if conn.broken || self.store.shared.drop_connections.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::Dropped { endpoint: self.endpoint.clone() });
        }
        Ok(())
    }

    fn has_broken(&self, conn: &mut MemoryConnection) -> bool {
        conn.broken
    }
}

/// Connection to a [`MemoryStore`]
///
/// Once a command fails at the socket level the connection stays broken.
#[derive(Debug)]
pub struct MemoryConnection {
    store: MemoryStore,
    endpoint: String,
    id: u64,
    broken: bool,
}

impl MemoryConnection {
    /// Sequence number of this connection, starting at 1
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    fn check(&mut self, command: &'static str) -> Result<(), StoreFault> {
        let shared = &self.store.shared;
        let dropped = shared.drop_connections.load(Ordering::SeqCst) || *shared.drop_on.lock() == Some(command);
        if self.broken || dropped {
            self.broken = true;
            return Err(StoreFault::connection(
                self.endpoint.as_str(),
                format!("{command}: connection reset by peer"),
            ));
        }
        if shared.reject_commands.load(Ordering::SeqCst) {
            return Err(StoreFault::command(command, "ERR command rejected"));
        }
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.store.shared.connections_closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl HashStore for MemoryConnection {
    fn hget(&mut self, name: &str, field: &[u8]) -> Result<Option<Vec<u8>>, StoreFault> {
        self.check("HGET")?;
        Ok(self.store.with_hash(name, |hash| hash.and_then(|h| h.fields.get(field).cloned())))
    }

    fn hset(&mut self, name: &str, field: &[u8], value: &[u8]) -> Result<(), StoreFault> {
        self.check("HSET")?;
        self.store.with_hash_entry(name, |hash| {
            hash.fields.insert(field.to_vec(), value.to_vec());
        });
        Ok(())
    }

    fn hdel(&mut self, name: &str, field: &[u8]) -> Result<u64, StoreFault> {
        self.check("HDEL")?;
        let mut hashes = self.store.shared.hashes.lock();
        let Some(hash) = hashes.get_mut(name).filter(|h| !h.is_expired(Instant::now())) else {
            return Ok(0);
        };
        let removed = hash.fields.shift_remove(field).map_or(0, |_| 1);
        // An emptied hash disappears, as in Redis
        if hash.fields.is_empty() {
            hashes.remove(name);
        }
        Ok(removed)
    }

    fn expire(&mut self, name: &str, seconds: i64) -> Result<bool, StoreFault> {
        self.check("EXPIRE")?;
        let deadline = Instant::now() + Duration::from_secs(seconds.max(0).unsigned_abs());
        Ok(self.store.with_hash(name, |hash| match hash {
            Some(h) => {
                h.expires_at = Some(deadline);
                true
            }
            None => false,
        }))
    }

    fn del(&mut self, name: &str) -> Result<bool, StoreFault> {
        self.check("DEL")?;
        Ok(self.store.remove_hash(name))
    }

    fn hlen(&mut self, name: &str) -> Result<usize, StoreFault> {
        self.check("HLEN")?;
        Ok(self.store.hash_len(name))
    }

    fn hkeys(&mut self, name: &str) -> Result<Vec<Vec<u8>>, StoreFault> {
        self.check("HKEYS")?;
        Ok(self.store.with_hash(name, |hash| {
            hash.map(|h| h.fields.keys().cloned().collect()).unwrap_or_default()
        }))
    }

    fn hvals(&mut self, name: &str) -> Result<Vec<Vec<u8>>, StoreFault> {
        self.check("HVALS")?;
        Ok(self.store.with_hash(name, |hash| {
            hash.map(|h| h.fields.values().cloned().collect()).unwrap_or_default()
        }))
    }
}
