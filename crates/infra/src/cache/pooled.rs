//! Scoped connection use for pooled backends

use r2d2::ManageConnection;
use shardcache_common::pool::StorePool;
use shardcache_domain::CacheResult;
use tracing::warn;

use crate::errors::map_pool_error;

/// Borrow one connection from `pool` and run `f` on it
///
/// The connection is discarded when `f` fails with a connectivity error and
/// returned to the pool on every other outcome.
pub(crate) fn with_connection<M, T, F>(pool: &StorePool<M>, cache: &str, op: &'static str, f: F) -> CacheResult<T>
where
    M: ManageConnection,
    F: FnOnce(&mut M::Connection) -> CacheResult<T>,
{
    let mut conn = pool.borrow().map_err(map_pool_error)?;
    let result = f(conn.connection());

    match &result {
        Err(err) if err.is_connectivity() => {
            warn!(cache, op, endpoint = conn.endpoint(), error = %err, "Discarding faulted store connection");
            conn.discard();
        }
        _ => conn.release(),
    }
    result
}
