//! Archive filter pipeline: decoder -> predicate filter -> partitioned sink
//! across many archives, tolerating per-file failures and reporting
//! aggregate counts.

use crate::config::PipelineConfig;
use crate::decoder::{quick_validate, stream_records};
use crate::filters::{RecordFilter, RecordVerdict};
use crate::mem::MemoryWatcher;
use crate::paths::discover_archives;
use crate::progress::{make_progress_bar_labeled, total_file_size};
use crate::record::parse_minimal;
use crate::sink::{PartitionKey, PartitionSink};
use crate::util::init_tracing_once;
use anyhow::Result;
use indicatif::ProgressBar;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregate outcome of one filter run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub files_processed: u64,
    pub files_failed: u64,
    pub records_kept: u64,
    pub records_malformed: u64,
    pub records_rejected_subreddit: u64,
    pub records_rejected_window: u64,
    pub records_rejected_language: u64,
}

#[derive(Default)]
struct Counters {
    files_processed: AtomicU64,
    files_failed: AtomicU64,
    kept: AtomicU64,
    malformed: AtomicU64,
    subreddit: AtomicU64,
    window: AtomicU64,
    language: AtomicU64,
}

pub struct ArchiveFilter {
    cfg: PipelineConfig,
}

impl ArchiveFilter {
    pub fn new(cfg: PipelineConfig) -> Self {
        Self { cfg }
    }

    pub fn run(&self) -> Result<FilterReport> {
        init_tracing_once();
        if let Some(n) = self.cfg.parallelism {
            if n > 0 {
                let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
            }
        }

        let archives = discover_archives(&self.cfg.archive_dir);
        if archives.is_empty() {
            tracing::warn!(dir = %self.cfg.archive_dir.display(), "No archives found; nothing to filter");
            return Ok(FilterReport::default());
        }
        tracing::info!("Planned {} archives for filtering.", archives.len());

        let sink = PartitionSink::new(&self.cfg.bronze_dir, self.cfg.write_buffer_bytes)?;
        let filter = RecordFilter::new(
            &self.cfg.subreddits,
            self.cfg.start_utc,
            self.cfg.end_utc,
            &self.cfg.languages,
        );
        let watcher = MemoryWatcher::new(self.cfg.low_memory_fraction);

        let pb = if self.cfg.progress {
            Some(make_progress_bar_labeled(total_file_size(&archives), Some("Filtering archives")))
        } else {
            None
        };

        let counters = Counters::default();

        crate::concurrency::for_each_limited(&archives, self.cfg.file_concurrency, |path| {
            if self.cfg.verify_archives {
                if let Err(e) = quick_validate(path, 4 * 1024 * 1024) {
                    warn_archive_skip(path, &e);
                    counters.files_failed.fetch_add(1, Ordering::Relaxed);
                    if let Some(pb) = &pb {
                        pb.inc(fs::metadata(path).map(|m| m.len()).unwrap_or(0));
                    }
                    return Ok(());
                }
            }

            match self.filter_one(path, &sink, &filter, &watcher, &counters, pb.as_ref()) {
                Ok(()) => {
                    counters.files_processed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    warn_archive_skip(path, &e);
                    counters.files_failed.fetch_add(1, Ordering::Relaxed);
                    if let Some(pb) = &pb {
                        pb.inc(fs::metadata(path).map(|m| m.len()).unwrap_or(0));
                    }
                }
            }
            Ok(())
        })?;

        sink.flush_all()?;
        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }

        let report = FilterReport {
            files_processed: counters.files_processed.load(Ordering::Relaxed),
            files_failed: counters.files_failed.load(Ordering::Relaxed),
            records_kept: counters.kept.load(Ordering::Relaxed),
            records_malformed: counters.malformed.load(Ordering::Relaxed),
            records_rejected_subreddit: counters.subreddit.load(Ordering::Relaxed),
            records_rejected_window: counters.window.load(Ordering::Relaxed),
            records_rejected_language: counters.language.load(Ordering::Relaxed),
        };
        tracing::info!(
            "Filter run complete: {} files processed ({} failed), {} records kept",
            report.files_processed,
            report.files_failed,
            report.records_kept
        );
        Ok(report)
    }

    fn filter_one(
        &self,
        path: &Path,
        sink: &PartitionSink,
        filter: &RecordFilter,
        watcher: &MemoryWatcher,
        counters: &Counters,
        pb: Option<&ProgressBar>,
    ) -> Result<()> {
        stream_records(
            path,
            self.cfg.read_block_bytes,
            |delta| {
                if let Some(pb) = pb {
                    pb.inc(delta);
                }
            },
            |raw| {
                let min = match parse_minimal(raw) {
                    Ok(m) => m,
                    Err(_) => {
                        counters.malformed.fetch_add(1, Ordering::Relaxed);
                        return Ok(());
                    }
                };
                match filter.classify_post(&min) {
                    RecordVerdict::Keep => {
                        let sub = min.subreddit.as_deref().unwrap_or_default();
                        let ts = min.created_utc.unwrap_or_default() as i64;
                        sink.write(&PartitionKey::new(sub, ts), raw)?;
                        counters.kept.fetch_add(1, Ordering::Relaxed);
                    }
                    RecordVerdict::Malformed => {
                        counters.malformed.fetch_add(1, Ordering::Relaxed);
                    }
                    RecordVerdict::SubredditRejected => {
                        counters.subreddit.fetch_add(1, Ordering::Relaxed);
                    }
                    RecordVerdict::OutsideWindow => {
                        counters.window.fetch_add(1, Ordering::Relaxed);
                    }
                    RecordVerdict::LanguageRejected => {
                        counters.language.fetch_add(1, Ordering::Relaxed);
                    }
                }
                watcher.throttle();
                Ok(())
            },
        )
    }
}

fn warn_archive_skip(path: &Path, e: &anyhow::Error) {
    // Print an absolute, canonical path to avoid truncation/ambiguity.
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let msg = format!(
        "Skipping archive after decode error\n  path : {}\n  error: {}\n\
         note : This usually indicates file corruption (often late/trailing). \
                Consider a full integrity check or re-downloading this archive. \
                The pipeline will skip this file and continue.",
        abs.display(),
        e
    );
    eprintln!("{}", msg);
    tracing::warn!("{}", msg);
}
