#[path = "common/mod.rs"]
mod common;

use common::*;
use redsift::{ArchiveFilter, PipelineConfig, Reconciler};

/// Full chain: archives → partitioned bronze corpus → canonical silver
/// dataset. The partition files written by the filter are exactly the batch
/// files the reconciliation engine consumes.
#[test]
fn archives_to_canonical_dataset() {
    let base = make_archive_corpus();
    let cfg = PipelineConfig::default()
        .with_base_dir(&base)
        .with_subreddits(["politics"])
        .with_progress(false);

    let filtered = ArchiveFilter::new(cfg.clone()).run().unwrap();
    assert_eq!(filtered.records_kept, 2);

    let report = Reconciler::new(cfg.clone()).run().unwrap();
    assert_eq!(report.batches_read, 2); // one partition file per kept month
    assert_eq!(report.rows_out, 2);
    assert_eq!(report.by_subreddit.get("Politics"), Some(&1));
    assert_eq!(report.by_subreddit.get("politics"), Some(&1));

    let rows = read_jsonl_values(&cfg.silver_path);
    assert_eq!(rows.len(), 2);

    let p1 = rows.iter().find(|r| r["id"] == "p1").unwrap();
    // Renamed, text-normalized, and carrying the rejoined sidecar payload.
    assert_eq!(p1["subreddit_nombre"], "Politics");
    assert_eq!(p1["titulo"], "Senate passes technology bill");
    assert_eq!(p1["titulo_limpio"], "senate passes technology bill");
    assert_eq!(p1["puntaje"].as_i64(), Some(42));
    let payload: serde_json::Value =
        serde_json::from_str(p1["extras"].as_str().unwrap()).unwrap();
    assert_eq!(payload["src"], "fixture");

    let p2 = rows.iter().find(|r| r["id"] == "p2").unwrap();
    assert_eq!(p2["subreddit_nombre"], "politics");
    // The p2 row had no extras payload: left join keeps it with the default.
    assert_eq!(p2["extras"], "");
}
