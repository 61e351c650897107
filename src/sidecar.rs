//! Sidecar handling for the free-form `extras` column: extracted by record
//! identity before the structural merge, rejoined after deduplication.

use crate::batch::Row;
use ahash::AHashMap;
use serde_json::Value;

/// Column carrying heterogeneous nested payloads incompatible with flat
/// typed columns.
pub const SIDECAR_COLUMN: &str = "extras";

/// Combine per-batch payload pairs into one id-keyed map. Batches arrive in
/// deterministic (path-sorted) order; the first payload per id wins.
pub fn collect_payloads(
    per_batch: impl IntoIterator<Item = Vec<(String, String)>>,
) -> AHashMap<String, String> {
    let mut map = AHashMap::new();
    for pairs in per_batch {
        for (id, payload) in pairs {
            map.entry(id).or_insert(payload);
        }
    }
    map
}

/// Left-join payloads back onto deduplicated rows by id. Rows without a
/// payload are left untouched; they are never dropped.
pub fn rejoin(rows: &mut [Row], payloads: &AHashMap<String, String>, column: &str) {
    if payloads.is_empty() {
        return;
    }
    for row in rows.iter_mut() {
        let id = match row.get("id").and_then(|v| v.as_str()) {
            Some(s) => s.to_string(),
            None => continue,
        };
        if let Some(p) = payloads.get(&id) {
            row.insert(column.to_string(), Value::String(p.clone()));
        }
    }
}
