use chrono::Local;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unix timestamp in seconds, the resolution the node uses in message headers.
pub fn create_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since_the_epoch| since_the_epoch.as_secs())
        .unwrap_or(0)
}

/// Local wall-clock time used to prefix session log lines.
pub fn format_log_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
