//! Configuration loader
//!
//! Loads the cache manager configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `SHARDCACHE_HOST` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `SHARDCACHE_HOST`: Store host, or `;`-separated `host:port` shard list
//! - `SHARDCACHE_PASSWORD`: Store password (optional)
//! - `SHARDCACHE_SHARDED`: Whether the host list is sharded (true/false)
//! - `SHARDCACHE_POOL_MAX_SIZE`: Connections per endpoint (optional)
//! - `SHARDCACHE_CHECKOUT_TIMEOUT_MS`: Borrow timeout in milliseconds (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./shardcache.json` or `./shardcache.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../shardcache.json` or `../shardcache.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use shardcache_domain::{CacheError, CacheManagerConfig, CacheResult};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the host variable
/// is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `CacheError::Configuration` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> CacheResult<CacheManagerConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Cache configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `SHARDCACHE_HOST` is required; every other variable falls back to its
/// default.
///
/// # Errors
/// Returns `CacheError::Configuration` if the host is missing or a value
/// cannot be parsed.
pub fn load_from_env() -> CacheResult<CacheManagerConfig> {
    let mut config = CacheManagerConfig::new(env_var("SHARDCACHE_HOST")?);
    config.password = std::env::var("SHARDCACHE_PASSWORD").ok();
    config.sharded = env_bool("SHARDCACHE_SHARDED", false);

    if let Some(max_size) = env_parse::<u32>("SHARDCACHE_POOL_MAX_SIZE")? {
        config.pool.max_size = max_size;
    }
    if let Some(timeout_ms) = env_parse::<u64>("SHARDCACHE_CHECKOUT_TIMEOUT_MS")? {
        config.pool.checkout_timeout_ms = timeout_ms;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CacheError::Configuration` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> CacheResult<CacheManagerConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CacheError::config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CacheError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading cache configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CacheError::config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> CacheResult<CacheManagerConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CacheError::config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CacheError::config(format!("Invalid JSON format: {}", e))),
        _ => Err(CacheError::config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 6] = [
        "shardcache.json",
        "shardcache.toml",
        "config.json",
        "config.toml",
        "../shardcache.json",
        "../shardcache.toml",
    ];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> CacheResult<String> {
    std::env::var(key)
        .map_err(|_| CacheError::config(format!("Missing required environment variable: {}", key)))
}

/// Parse an optional environment variable
fn env_parse<T>(key: &str) -> CacheResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CacheError::config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
