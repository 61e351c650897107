use anyhow::{Context, Result};
use redsift::{ArchiveFilter, Lang, PipelineConfig, Reconciler};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Environment-driven runner: filter the raw archives into the partitioned
/// bronze corpus, then reconcile bronze into the canonical silver dataset.
///
/// Recognized variables: DATA_DIR, SUBREDDITS (comma-separated), DATE_START /
/// DATE_END (RFC3339), LANGS (ISO 639-3 codes, comma-separated), THREADS.
fn main() -> Result<()> {
    let mut cfg = PipelineConfig::default();

    if let Ok(dir) = std::env::var("DATA_DIR") {
        cfg = cfg.with_base_dir(PathBuf::from(dir));
    }
    if let Ok(subs) = std::env::var("SUBREDDITS") {
        cfg = cfg.with_subreddits(subs.split(','));
    }
    if let (Ok(start), Ok(end)) = (std::env::var("DATE_START"), std::env::var("DATE_END")) {
        let start = OffsetDateTime::parse(&start, &Rfc3339).context("DATE_START must be RFC3339")?;
        let end = OffsetDateTime::parse(&end, &Rfc3339).context("DATE_END must be RFC3339")?;
        cfg = cfg.with_date_window(start.unix_timestamp(), end.unix_timestamp());
    }
    if let Ok(langs) = std::env::var("LANGS") {
        let langs: Vec<Lang> = langs
            .split(',')
            .filter_map(|code| Lang::from_code(code.trim()))
            .collect();
        if !langs.is_empty() {
            cfg = cfg.with_languages(langs);
        }
    }
    if let Ok(threads) = std::env::var("THREADS") {
        if let Ok(n) = threads.parse::<usize>() {
            cfg = cfg.with_parallelism(n).with_file_concurrency(n.min(4));
        }
    }

    let filtered = ArchiveFilter::new(cfg.clone()).run()?;
    println!(
        "Filtered {} archives ({} failed); kept {} records",
        filtered.files_processed, filtered.files_failed, filtered.records_kept
    );

    let reconciled = Reconciler::new(cfg).run()?;
    println!(
        "Canonical dataset: {} rows ({} duplicates removed) from {} batches",
        reconciled.rows_out, reconciled.duplicates_removed, reconciled.batches_read
    );

    Ok(())
}
