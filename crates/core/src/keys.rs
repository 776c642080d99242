//! Cache key building

use std::fmt::Display;

use shardcache_domain::constants::KEY_SEPARATOR;

/// Build a cache key from a cache name and parameters.
///
/// Parts are rendered with `Display`, stripped of all whitespace, and joined
/// to the name with `.`. Parts that are empty after stripping are skipped,
/// so a call without parts returns the name itself.
pub fn cache_key<I, P>(name: &str, parts: I) -> String
where
    I: IntoIterator<Item = P>,
    P: Display,
{
    let mut key = String::from(name);
    for part in parts {
        let part: String = part.to_string().chars().filter(|c| !c.is_whitespace()).collect();
        if part.is_empty() {
            continue;
        }
        key.push(KEY_SEPARATOR);
        key.push_str(&part);
    }
    key
}
