//! TESSERA - Time-To-Live (TTL) Support
//! Expiration helpers shared by entries and the memtable.
//!
//! Expirations are absolute Unix timestamps in seconds. A timestamp of `0`
//! means the entry never expires. Expired entries are not removed from the
//! skip list; readers treat them as absent.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current time in seconds since the Unix epoch.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Absolute expiration timestamp for a TTL starting now.
pub fn deadline_after(ttl: Duration) -> u64 {
    now_secs().saturating_add(ttl.as_secs())
}

/// Check if `expires_at` has passed as of `now`.
/// Returns `false` for `0` (no TTL).
pub fn is_expired(expires_at: u64, now: u64) -> bool {
    expires_at != 0 && now >= expires_at
}

/// Get the remaining TTL in seconds.
/// Returns `None` if there is no TTL and `Some(0)` once it has passed.
pub fn remaining_ttl(expires_at: u64, now: u64) -> Option<u64> {
    if expires_at == 0 {
        return None;
    }
    Some(expires_at.saturating_sub(now))
}
