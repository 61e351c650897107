#[path = "common/mod.rs"]
mod common;

use common::*;
use redsift::{ArchiveFilter, PipelineConfig};

fn corpus_config(base: &std::path::Path) -> PipelineConfig {
    PipelineConfig::default()
        .with_base_dir(base)
        .with_subreddits(["politics"])
        .with_progress(false)
}

/// Scenario A: the English and Spanish r/politics records inside the window
/// are kept and routed to their (subreddit, month) partitions; the r/funny
/// record is dropped without creating a partition; out-of-window, empty-text
/// and German records are dropped; the malformed line is counted, not fatal.
#[test]
fn scenario_a_partitions_accepted_records() {
    let base = make_archive_corpus();
    let report = ArchiveFilter::new(corpus_config(&base)).run().unwrap();

    assert_eq!(report.files_processed, 2);
    assert_eq!(report.files_failed, 0);
    assert_eq!(report.records_kept, 2);
    assert_eq!(report.records_rejected_subreddit, 1);
    assert_eq!(report.records_rejected_window, 1);
    assert_eq!(report.records_rejected_language, 2);
    assert_eq!(report.records_malformed, 1);

    // Accepted records land in lowercase (subreddit, month) partitions,
    // bytes preserved verbatim.
    let march = base
        .join("bronze")
        .join("politics")
        .join("2021-03")
        .join("politics_2021-03.jsonl");
    let lines = read_lines(&march);
    assert_eq!(lines.len(), 1);
    let v: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(v["id"], "p1");
    assert_eq!(v["subreddit"], "Politics");

    let april = base
        .join("bronze")
        .join("politics")
        .join("2021-04")
        .join("politics_2021-04.jsonl");
    assert_eq!(read_lines(&april).len(), 1);

    // No partition directory is ever created for the rejected subreddit.
    assert!(!base.join("bronze").join("funny").exists());
}

/// Both window bounds are closed: records at exactly START and exactly END
/// are accepted, one second past END is not.
#[test]
fn window_bounds_are_inclusive() {
    let base = tempfile::tempdir().unwrap().into_path();
    let raw = base.join("bronze").join("raw_zst");
    let start = 1_500_000_000i64;
    let end = 1_500_000_100i64;

    let lines: Vec<String> = [start, end, end + 1]
        .iter()
        .enumerate()
        .map(|(i, ts)| {
            serde_json::json!({
                "id": format!("b{}", i), "subreddit": "politics",
                "created_utc": ts, "title": "Boundary check", "selftext": ENGLISH_TEXT
            })
            .to_string()
        })
        .collect();
    write_zst_lines(&raw.join("RS_2017-07.zst"), &lines);

    let report = ArchiveFilter::new(
        corpus_config(&base).with_date_window(start, end),
    )
    .run()
    .unwrap();

    assert_eq!(report.records_kept, 2);
    assert_eq!(report.records_rejected_window, 1);
}

/// An archive whose final record has no trailing newline still yields that
/// record: the decoder emits the trimmed tail fragment at EOF.
#[test]
fn archive_without_trailing_newline_keeps_last_record() {
    use std::io::Write;

    let base = tempfile::tempdir().unwrap().into_path();
    let raw = base.join("bronze").join("raw_zst").join("RS_2021-06.zst");
    std::fs::create_dir_all(raw.parent().unwrap()).unwrap();

    let line = |id: &str| {
        serde_json::json!({
            "id": id, "subreddit": "politics", "created_utc": 1_622_600_000i64,
            "title": "Trailing newline check", "selftext": ENGLISH_TEXT
        })
        .to_string()
    };
    let f = std::fs::File::create(&raw).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    write!(&mut enc, "{}\n{}", line("t1"), line("t2")).unwrap();
    enc.finish().unwrap();

    let report = ArchiveFilter::new(corpus_config(&base)).run().unwrap();
    assert_eq!(report.records_kept, 2);
}

/// One corrupt archive must not abort the batch: it is logged, counted as
/// failed, and the remaining archives are still processed in full.
#[test]
fn corrupt_archive_is_skipped_and_counted() {
    let base = make_archive_corpus();
    add_corrupt_archive(&base);

    let report = ArchiveFilter::new(corpus_config(&base)).run().unwrap();

    assert_eq!(report.files_processed, 2);
    assert_eq!(report.files_failed, 1);
    assert_eq!(report.records_kept, 2);
}

/// Rerunning over the same archives appends duplicate lines to partitions.
/// That is the documented sink contract; identity dedup happens only in the
/// downstream merge.
#[test]
fn rerun_appends_to_partitions() {
    let base = make_archive_corpus();
    let cfg = corpus_config(&base);

    ArchiveFilter::new(cfg.clone()).run().unwrap();
    ArchiveFilter::new(cfg).run().unwrap();

    let march = base
        .join("bronze")
        .join("politics")
        .join("2021-03")
        .join("politics_2021-03.jsonl");
    assert_eq!(read_lines(&march).len(), 2);
}
