//! Timestamp helpers for log entries and sink payloads.

use chrono::Utc;

/// Returns the current UTC time as an ISO 8601 formatted string.
///
/// # Examples
///
/// ```
/// use frameflow::utils::iso_timestamp;
///
/// let ts = iso_timestamp();
/// assert!(ts.contains('T'));
/// assert!(ts.ends_with("+00:00"));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Returns a short wall-clock stamp (`mm:ss.mmm`) for run log entries.
#[must_use]
pub fn clock_stamp() -> String {
    Utc::now().format("%M:%S%.3f").to_string()
}
