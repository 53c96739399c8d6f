use chrono::Utc;

pub mod error;

/// Current wall-clock time as unix epoch milliseconds.
#[must_use]
pub fn unix_millis_now() -> i64 {
	Utc::now().timestamp_millis()
}
