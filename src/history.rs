use chrono::{DateTime, NaiveDateTime};

use crate::types::DocumentRecord;

/// Placeholder shown wherever a timestamp is absent or unparsable.
pub const TIMESTAMP_PLACEHOLDER: &str = "-";

/// Case-insensitive substring filter over subject, receiver email and serial.
/// Original order is preserved; an empty or whitespace-only query returns the
/// full input.
pub fn filter_records(records: &[DocumentRecord], query: &str) -> Vec<DocumentRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| record_matches(r, &needle))
        .cloned()
        .collect()
}

fn record_matches(record: &DocumentRecord, needle: &str) -> bool {
    record.subject.to_lowercase().contains(needle)
        || record.receiver_email.to_lowercase().contains(needle)
        || record.serial.to_lowercase().contains(needle)
}

/// Render a backend timestamp as "07 Aug 2026 14:30". The backend sends
/// RFC 3339; older rows come back without an offset, so try that shape too.
/// Anything else degrades to the placeholder dash.
pub fn format_timestamp(value: Option<&str>) -> String {
    let raw = match value {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => return TIMESTAMP_PLACEHOLDER.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d %b %Y %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%d %b %Y %H:%M").to_string();
        }
    }
    TIMESTAMP_PLACEHOLDER.to_string()
}
