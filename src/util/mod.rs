//! Shared helpers: the persisted timestamp format and feed URL validation.

mod time;
mod url_check;

pub use time::{format_timestamp, now_timestamp, parse_timestamp, TIMESTAMP_FORMAT};
pub use url_check::{validate_feed_url, UrlValidationError};
