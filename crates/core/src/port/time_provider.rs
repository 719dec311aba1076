// Time Provider Port (for testability)

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Calendar date (UTC) as `YYYYMMDD`, used in temp file names
    fn date_stamp(&self) -> String {
        chrono::DateTime::<chrono::Utc>::from_timestamp_millis(self.now_millis())
            .map(|dt| dt.format("%Y%m%d").to_string())
            .unwrap_or_else(|| "19700101".to_string())
    }
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
