use anyhow::Result;
use chrono::Utc;
use feed_rs::parser;

use crate::repo::Headline;
use crate::util::format_timestamp;

/// Parses a fetched RSS/Atom body into headline records.
///
/// Entries without a usable title are skipped: headline text is the natural
/// key on the consumer side, so a blank one can never be surfaced or
/// deduplicated. The feed name is filled in by the caller.
pub fn parse_headlines(bytes: &[u8]) -> Result<Vec<Headline>> {
    let feed = parser::parse(bytes)?;

    let headlines = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let headline = entry.title.map(|t| t.content).unwrap_or_default();
            if headline.trim().is_empty() {
                return None;
            }

            let url = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let article_date = entry
                .published
                .or(entry.updated)
                .map(|dt| format_timestamp(dt.with_timezone(&Utc)))
                .unwrap_or_default();
            let article_summary = entry.summary.map(|s| s.content).unwrap_or_default();
            let article_text = entry
                .content
                .and_then(|c| c.body)
                .unwrap_or_else(|| article_summary.clone());

            Some(Headline {
                feed_name: String::new(),
                headline,
                article_date,
                article_summary,
                article_text,
                url,
                row_id: 0,
            })
        })
        .collect();

    Ok(headlines)
}
