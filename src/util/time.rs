use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp layout used everywhere a retrieval instant is persisted.
///
/// The store is string-typed, and this layout sorts lexicographically in
/// chronological order, so retention pruning can compare timestamps as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC instant in the persisted layout.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a persisted timestamp. Empty or malformed text reads as `None`;
/// a feed that has never been retrieved stores an empty string.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
