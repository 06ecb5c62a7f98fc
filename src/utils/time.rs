//! Timestamp helpers for grant bookkeeping.
//!
//! `created_at` / `updated_at` on every permission row are stored as
//! RFC 3339 UTC strings with second precision, e.g. "2025-12-17T02:30:00Z".
use chrono::{DateTime, Utc};

/// Current UTC timestamp in RFC 3339 format.
///
/// # Example
/// ```
/// let timestamp = permission_ledger::utils::now_utc();
/// assert!(timestamp.ends_with('Z'));
/// ```
pub fn now_utc() -> String {
    format_utc(Utc::now())
}

/// Parse an RFC 3339 timestamp read back from the store.
pub fn parse_to_utc(timestamp: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", timestamp, e))
}

pub(crate) fn format_utc(datetime: DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_now_utc() {
        let timestamp = now_utc();
        assert!(timestamp.ends_with('Z'), "UTC timestamp should end with Z");
        assert!(parse_to_utc(&timestamp).is_ok());
    }

    #[test]
    fn test_parse_to_utc_converts_offsets() {
        let dt = parse_to_utc("2025-12-17T10:30:00+08:00").unwrap();
        assert_eq!(dt.hour(), 2);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        let result = parse_to_utc("yesterday");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid timestamp"));
    }
}
