use std::path::{Path, PathBuf};
use whatlang::Lang;

/// Inclusive ingestion window start (2020-01-01T00:00:00Z).
pub const DEFAULT_START_UTC: i64 = 1_577_836_800;
/// Inclusive ingestion window end (2024-12-31T23:59:59Z).
pub const DEFAULT_END_UTC: i64 = 1_735_689_599;

/// Default subreddit allow-set.
pub const DEFAULT_SUBREDDITS: &[&str] = &[
    "politics", "worldnews", "technology", "health", "ecuador",
    "business", "technews", "artificial", "futurology",
];

/// Explicit configuration for both pipelines, constructed once at process
/// start and passed into each component. Components never read ambient
/// process state.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub base_dir: PathBuf,
    pub archive_dir: PathBuf,  // compressed .zst archives (input)
    pub bronze_dir: PathBuf,   // partitioned raw output / batch input
    pub silver_path: PathBuf,  // canonical output file

    pub subreddits: Vec<String>, // normalized lowercase, sorted, deduped
    pub start_utc: i64,          // inclusive
    pub end_utc: i64,            // inclusive
    pub languages: Vec<Lang>,

    pub parallelism: Option<usize>, // Some(N) to set rayon threads
    pub file_concurrency: usize,    // archives/batches decoded concurrently
    pub verify_archives: bool,      // quick integrity probe before filtering
    pub progress: bool,

    // IO tuning
    pub read_block_bytes: usize,
    pub write_buffer_bytes: usize,
    pub low_memory_fraction: f64, // cooperative throttle threshold
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let base = PathBuf::from("./data");
        Self {
            archive_dir: base.join("bronze").join("raw_zst"),
            bronze_dir: base.join("bronze"),
            silver_path: base.join("silver").join("silver.ndjson"),
            base_dir: base,
            subreddits: normalize_subreddits(DEFAULT_SUBREDDITS.iter().map(|s| s.to_string())),
            start_utc: DEFAULT_START_UTC,
            end_utc: DEFAULT_END_UTC,
            languages: vec![Lang::Eng, Lang::Spa],
            parallelism: None,
            file_concurrency: 1, // safe default to prevent OOM on big .zst windows
            verify_archives: false,
            progress: true,
            read_block_bytes: 1 << 20,
            write_buffer_bytes: 256 * 1024,
            low_memory_fraction: 0.10,
        }
    }
}

fn normalize_subreddits<I: IntoIterator<Item = String>>(iter: I) -> Vec<String> {
    let mut v: Vec<String> = iter
        .into_iter()
        .map(|s| {
            let s = s.trim().to_lowercase();
            match s.strip_prefix("r/") {
                Some(rest) => rest.to_string(),
                None => s,
            }
        })
        .filter(|s| !s.is_empty())
        .collect();
    v.sort();
    v.dedup();
    v
}

impl PipelineConfig {
    pub fn with_base_dir(mut self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref().to_path_buf();
        self.archive_dir = base.join("bronze").join("raw_zst");
        self.bronze_dir = base.join("bronze");
        self.silver_path = base.join("silver").join("silver.ndjson");
        self.base_dir = base;
        self
    }
    pub fn with_archive_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.archive_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_bronze_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.bronze_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_silver_path(mut self, path: impl AsRef<Path>) -> Self {
        self.silver_path = path.as_ref().to_path_buf();
        self
    }
    pub fn with_subreddits<I, S>(mut self, subs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.subreddits = normalize_subreddits(subs.into_iter().map(|s| s.as_ref().to_string()));
        self
    }
    pub fn with_date_window(mut self, start_utc: i64, end_utc: i64) -> Self {
        self.start_utc = start_utc;
        self.end_utc = end_utc;
        self
    }
    pub fn with_languages<I: IntoIterator<Item = Lang>>(mut self, langs: I) -> Self {
        self.languages = langs.into_iter().collect();
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_verify_archives(mut self, yes: bool) -> Self {
        self.verify_archives = yes;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_read_block(mut self, bytes: usize) -> Self {
        self.read_block_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_low_memory_fraction(mut self, frac: f64) -> Self {
        self.low_memory_fraction = frac.clamp(0.0, 0.5);
        self
    }
}
