//! Diagonal concatenation and identity deduplication.

use crate::batch::{Batch, Row};
use ahash::AHashMap;
use serde_json::Value;

/// Outcome counts for the merge stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct MergeStats {
    pub rows_in: u64,
    pub rows_out: u64,
    pub duplicates_removed: u64,
    pub rows_without_id: u64,
}

/// Concatenate all batches and keep exactly one row per id. Columns absent
/// from a batch stay absent from its rows here; the canonicalizer's
/// null-fill materializes them.
///
/// Tie-break: the row with the greatest `created_utc` survives; on equal
/// timestamps the first-encountered row (in path-sorted batch order) wins,
/// and the survivor keeps the first occurrence's output position. Rows with
/// no usable id cannot be deduplicated and are dropped with a count.
pub fn merge_dedup(batches: Vec<Batch>) -> (Vec<Row>, MergeStats) {
    let mut stats = MergeStats::default();
    let mut rows: Vec<Row> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();

    for batch in batches {
        for row in batch.rows {
            stats.rows_in += 1;
            let id = match row.get("id").and_then(|v| v.as_str()) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => {
                    stats.rows_without_id += 1;
                    continue;
                }
            };
            match index.get(&id) {
                None => {
                    index.insert(id, rows.len());
                    rows.push(row);
                }
                Some(&at) => {
                    stats.duplicates_removed += 1;
                    if created_utc(&row) > created_utc(&rows[at]) {
                        rows[at] = row;
                    }
                }
            }
        }
    }

    stats.rows_out = rows.len() as u64;
    (rows, stats)
}

fn created_utc(row: &Row) -> f64 {
    match row.get("created_utc") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::MIN),
        Some(Value::String(s)) => s.parse().unwrap_or(f64::MIN),
        _ => f64::MIN,
    }
}
