use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, used as a block's timestamp.
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_secs() as i64
}
