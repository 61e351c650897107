use anyhow::Result;
use serde::Deserialize;

/// Minimal line-level view for fast filtering. Extra fields are ignored by
/// serde. `created_utc` is f64 because monthly dumps carry integer seconds
/// while live ingests carry floats; both must deserialize.
#[derive(Debug, Deserialize)]
pub struct MinimalPost {
    pub subreddit: Option<String>,
    pub created_utc: Option<f64>,
    pub title: Option<String>,
    pub selftext: Option<String>,
}

/// Parse a raw record into `MinimalPost` using serde_json.
#[inline]
pub fn parse_minimal(raw: &[u8]) -> Result<MinimalPost> {
    Ok(serde_json::from_slice(raw)?)
}
