//! Predicate filter: subreddit allow-set, inclusive timestamp window, and
//! language identification over title+selftext.

use crate::record::{parse_minimal, MinimalPost};
use whatlang::Lang;

/// Per-record classification outcome. Expected skips are values, not errors;
/// the orchestrating loop turns them into counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordVerdict {
    Keep,
    Malformed,
    SubredditRejected,
    OutsideWindow,
    LanguageRejected,
}

/// The three acceptance predicates, applied in cost order (cheapest first).
#[derive(Clone, Debug)]
pub struct RecordFilter {
    subreddits: Vec<String>, // lowercase, sorted for binary_search
    start_utc: i64,
    end_utc: i64,
    languages: Vec<Lang>,
}

impl RecordFilter {
    pub fn new(subreddits: &[String], start_utc: i64, end_utc: i64, languages: &[Lang]) -> Self {
        let mut subs: Vec<String> = subreddits.iter().map(|s| s.trim().to_lowercase()).collect();
        subs.sort();
        subs.dedup();
        Self {
            subreddits: subs,
            start_utc,
            end_utc,
            languages: languages.to_vec(),
        }
    }

    /// Classify one raw record. All three predicates must pass for `Keep`.
    pub fn classify(&self, raw: &[u8]) -> RecordVerdict {
        match parse_minimal(raw) {
            Ok(min) => self.classify_post(&min),
            Err(_) => RecordVerdict::Malformed,
        }
    }

    /// Classify an already-parsed record view.
    pub fn classify_post(&self, min: &MinimalPost) -> RecordVerdict {
        match min.subreddit.as_deref().map(|s| s.to_lowercase()) {
            Some(s) if self.subreddits.binary_search(&s).is_ok() => {}
            _ => return RecordVerdict::SubredditRejected,
        }

        // Window bounds are closed on both ends.
        match min.created_utc {
            Some(ts) if ts >= self.start_utc as f64 && ts <= self.end_utc as f64 => {}
            _ => return RecordVerdict::OutsideWindow,
        }

        match detect_language(min.title.as_deref(), min.selftext.as_deref()) {
            Some(lang) if self.languages.contains(&lang) => RecordVerdict::Keep,
            _ => RecordVerdict::LanguageRejected,
        }
    }
}

/// Identify the dominant language of `title` + `selftext`, joined by a single
/// space and trimmed. Returns `None` when the combined text is empty (the
/// "und" case) or classification fails.
pub fn detect_language(title: Option<&str>, selftext: Option<&str>) -> Option<Lang> {
    let text = format!("{} {}", title.unwrap_or(""), selftext.unwrap_or(""));
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    whatlang::detect_lang(text)
}
