//! Broken-connection tracking for r2d2 managers
//!
//! r2d2 asks its manager whether a connection is broken every time one is
//! returned. Store connections usually cannot tell on their own that the
//! last command failed at the socket level, so [`TrackedManager`] wraps any
//! manager and lets the holder of a connection flag it explicitly.

use r2d2::ManageConnection;

/// Connection wrapper carrying an explicit broken flag
#[derive(Debug)]
pub struct TrackedConnection<C> {
    inner: C,
    broken: bool,
}

impl<C> TrackedConnection<C> {
    pub(crate) fn new(inner: C) -> Self {
        Self { inner, broken: false }
    }

    /// Access the underlying connection
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Flag the connection so the pool drops it instead of reusing it
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

/// Manager adapter that honours [`TrackedConnection::mark_broken`]
#[derive(Debug)]
pub struct TrackedManager<M> {
    inner: M,
}

impl<M> TrackedManager<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    /// Get the wrapped manager
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: ManageConnection> ManageConnection for TrackedManager<M> {
    type Connection = TrackedConnection<M::Connection>;
    type Error = M::Error;

    fn connect(&self) -> Result<Self::Connection, Self::Error> {
        self.inner.connect().map(TrackedConnection::new)
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        self.inner.is_valid(&mut conn.inner)
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.broken || self.inner.has_broken(&mut conn.inner)
    }
}
