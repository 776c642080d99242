//! Pool of connections to a single store endpoint
//!
//! Wraps an r2d2 pool so callers get the three operations a cache needs:
//! borrow a connection, release it healthy, or discard it after a fault.
//! Discarded connections are never handed out again.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use r2d2::{HandleError, ManageConnection, Pool, PooledConnection};
use tracing::{debug, info, instrument, warn};

use super::config::PoolConfig;
use super::error::{PoolError, PoolResult};
use super::metrics::PoolMetrics;
use super::tracked::TrackedManager;
use super::types::{HealthStatus, PoolState};

/// Routes background connection errors from r2d2 to tracing
#[derive(Debug)]
struct TracingErrorHandler {
    endpoint: Arc<str>,
}

impl<E: fmt::Display> HandleError<E> for TracingErrorHandler {
    fn handle_error(&self, error: E) {
        warn!(endpoint = %self.endpoint, error = %error, "Store connection error");
    }
}

/// Connection pool bound to one endpoint
///
/// The pool opens connections lazily: constructing it never touches the
/// network, so an unreachable endpoint only surfaces on the first borrow.
pub struct StorePool<M: ManageConnection> {
    pool: Pool<TrackedManager<M>>,
    endpoint: Arc<str>,
    config: PoolConfig,
    metrics: Arc<PoolMetrics>,
    closed: AtomicBool,
}

impl<M: ManageConnection> StorePool<M> {
    /// Create a pool for `endpoint` using `manager` to open connections
    ///
    /// # Errors
    /// Returns `PoolError::InvalidConfig` if the configuration is rejected.
    #[instrument(skip(manager, config), fields(pool_size = config.max_size))]
    pub fn new(endpoint: &str, manager: M, config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        let endpoint: Arc<str> = Arc::from(endpoint);
        let metrics = Arc::new(PoolMetrics::new(config.max_size));

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .test_on_check_out(config.test_on_borrow)
            .connection_timeout(config.connection_timeout)
            .idle_timeout(config.idle_timeout)
            .error_handler(Box::new(TracingErrorHandler { endpoint: Arc::clone(&endpoint) }))
            .build_unchecked(TrackedManager::new(manager));

        info!("Store pool created with up to {} connections", config.max_size);

        Ok(Self { pool, endpoint, config, metrics, closed: AtomicBool::new(false) })
    }

    /// Borrow a connection
    ///
    /// Blocks up to `connection_timeout` while the pool is exhausted or the
    /// endpoint refuses new connections.
    ///
    /// # Errors
    /// Returns `PoolError::Closed` after [`StorePool::close`], or
    /// `PoolError::Checkout` when no connection could be obtained in time.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub fn borrow(&self) -> PoolResult<PooledStore<M>> {
        if self.is_closed() {
            self.metrics.record_checkout_error();
            return Err(PoolError::Closed { endpoint: self.endpoint.to_string() });
        }

        let start = Instant::now();
        match self.pool.get() {
            Ok(conn) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                self.metrics.record_acquired(duration_ms);
                debug!("Connection acquired in {}ms", duration_ms);

                Ok(PooledStore {
                    conn,
                    endpoint: Arc::clone(&self.endpoint),
                    metrics: Arc::clone(&self.metrics),
                })
            }
            Err(e) => {
                self.metrics.record_checkout_error();
                warn!("Connection checkout failed after {:?}: {}", self.config.connection_timeout, e);
                Err(PoolError::Checkout {
                    endpoint: self.endpoint.to_string(),
                    timeout: self.config.connection_timeout,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Current connection counts
    pub fn state(&self) -> PoolState {
        let state = self.pool.state();
        PoolState { connections: state.connections, idle_connections: state.idle_connections }
    }

    /// Try to borrow a connection and report the pool's condition
    pub fn health_check(&self) -> HealthStatus {
        if self.is_closed() {
            return HealthStatus::unhealthy(format!("Pool for {} is closed", self.endpoint));
        }

        match self.pool.get() {
            Ok(_conn) => {
                let state = self.pool.state();
                HealthStatus::healthy(
                    state.connections as usize,
                    state.idle_connections as usize,
                    self.config.max_size as usize,
                )
            }
            Err(e) => HealthStatus::unhealthy(format!("Pool unhealthy: {}", e)),
        }
    }

    /// Refuse all further borrows
    ///
    /// Connections already checked out stay usable until released. Idle
    /// connections are closed when the last handle to the pool is dropped.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(endpoint = %self.endpoint, "Store pool closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Endpoint this pool connects to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get the pool metrics
    pub fn metrics(&self) -> &Arc<PoolMetrics> {
        &self.metrics
    }
}

impl<M: ManageConnection> fmt::Debug for StorePool<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorePool")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A connection checked out of a [`StorePool`]
///
/// Dropping the guard releases the connection. Call [`PooledStore::discard`]
/// (or [`PooledStore::mark_broken`] before dropping) when the connection
/// faulted, so the pool closes it instead of reusing it.
pub struct PooledStore<M: ManageConnection> {
    conn: PooledConnection<TrackedManager<M>>,
    endpoint: Arc<str>,
    metrics: Arc<PoolMetrics>,
}

impl<M: ManageConnection> PooledStore<M> {
    /// Access the underlying store connection
    pub fn connection(&mut self) -> &mut M::Connection {
        self.conn.get_mut()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Flag the connection as broken; it is closed when the guard drops
    pub fn mark_broken(&mut self) {
        self.conn.mark_broken();
    }

    pub fn is_broken(&self) -> bool {
        self.conn.is_broken()
    }

    /// Return a healthy connection to the pool
    pub fn release(self) {
        drop(self);
    }

    /// Close the connection instead of returning it
    pub fn discard(mut self) {
        self.mark_broken();
    }
}

impl<M: ManageConnection> Drop for PooledStore<M> {
    fn drop(&mut self) {
        if self.conn.is_broken() {
            self.metrics.record_discarded();
            debug!(endpoint = %self.endpoint, "Discarding broken connection");
        } else {
            self.metrics.record_returned();
        }
    }
}

impl<M: ManageConnection> fmt::Debug for PooledStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledStore")
            .field("endpoint", &self.endpoint)
            .field("broken", &self.is_broken())
            .finish()
    }
}
