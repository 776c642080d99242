//! Pool status types

/// Health status of a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    /// Whether a connection could be borrowed
    pub healthy: bool,

    /// Number of open connections (idle plus in use)
    pub active_connections: usize,

    /// Number of idle connections
    pub idle_connections: usize,

    /// Maximum pool size
    pub max_connections: usize,

    /// Optional error message if unhealthy
    pub message: Option<String>,
}

impl HealthStatus {
    /// Create a healthy status
    pub fn healthy(active: usize, idle: usize, max: usize) -> Self {
        Self {
            healthy: true,
            active_connections: active,
            idle_connections: idle,
            max_connections: max,
            message: None,
        }
    }

    /// Create an unhealthy status
    pub fn unhealthy(message: String) -> Self {
        Self {
            healthy: false,
            active_connections: 0,
            idle_connections: 0,
            max_connections: 0,
            message: Some(message),
        }
    }
}

/// Point-in-time view of the pool's connection counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    /// Open connections, idle plus checked out
    pub connections: u32,

    /// Connections sitting idle and available for borrowing
    pub idle_connections: u32,
}

impl PoolState {
    /// Connections currently checked out by callers
    pub fn in_use(&self) -> u32 {
        self.connections.saturating_sub(self.idle_connections)
    }
}

/// Copy of the pool counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolMetricsSnapshot {
    /// Total connections borrowed
    pub connections_acquired: u64,

    /// Total connections returned healthy
    pub connections_returned: u64,

    /// Total connections discarded as broken
    pub connections_discarded: u64,

    /// Total failed checkouts
    pub checkout_errors: u64,

    /// Average checkout time (milliseconds)
    pub avg_acquire_time_ms: u64,
}
