//! Cache warm-up hooks
//!
//! Components that fill caches once the manager is ready implement
//! [`CachePreload`]; the application runs them with [`run_preloads`] right
//! after `init`.

use std::time::Instant;

use shardcache_domain::CacheResult;
use tracing::{info, warn};

/// A component that warms one or more caches
pub trait CachePreload: Send + Sync {
    /// Label used in logs
    fn name(&self) -> &str;

    /// Load entries into the caches this component owns
    fn preload(&self) -> CacheResult<()>;
}

/// Run every preload in order, stopping at the first failure
///
/// Returns the number of preloads that completed.
///
/// # Errors
/// Returns the error of the first preload that fails; later preloads are
/// not run.
pub fn run_preloads(preloads: &[&dyn CachePreload]) -> CacheResult<usize> {
    for (completed, preload) in preloads.iter().enumerate() {
        let start = Instant::now();
        if let Err(e) = preload.preload() {
            warn!(preload = preload.name(), error = %e, "Cache preload failed");
            return Err(e);
        }
        info!(
            preload = preload.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Cache preload finished ({}/{})",
            completed + 1,
            preloads.len()
        );
    }
    Ok(preloads.len())
}
