use chrono::Utc;

/// Milliseconds since the Unix epoch.
pub fn epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}
