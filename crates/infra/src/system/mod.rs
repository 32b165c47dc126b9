use chrono::Utc;

/// Clock abstraction so that time-dependent code can be tested with a
/// static clock.
pub trait ISys: Send + Sync {
    /// Current unix-epoch timestamp in millis.
    fn get_timestamp_millis(&self) -> i64;
}

/// Production clock.
pub struct RealSys {}

impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
