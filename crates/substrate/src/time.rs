//! Second-resolution epoch timestamps, the only clock every service's
//! `created_at` column needs (spec §4).

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, truncated to fit the wire's `i32` fields.
/// Good until 2038, same as every `created_at` column that stores it.
pub fn now_epoch() -> i32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i32
}
