//! Batch loading: one NDJSON file = one batch of rows plus its observed
//! per-column schema. Sidecar payloads are pulled out here, before type
//! observation, so they never influence resolution.

use crate::schema::{resolve_column_type, value_type, ColumnType};
use crate::sidecar::SIDECAR_COLUMN;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub type Row = Map<String, Value>;

/// One independently-produced batch, immutable once loaded.
#[derive(Debug)]
pub struct Batch {
    pub path: PathBuf,
    pub rows: Vec<Row>,
    /// Observed type per column: non-null cell types collapsed with the
    /// resolution precedence; a column whose cells are all null observes
    /// `Null`.
    pub schema: BTreeMap<String, ColumnType>,
    /// `(id, payload)` pairs extracted from the sidecar column.
    pub sidecar: Vec<(String, String)>,
    /// Lines that did not parse as JSON objects.
    pub skipped_lines: u64,
}

pub fn load_batch(path: &Path, read_buf: usize) -> Result<Batch> {
    let file = crate::util::open_with_backoff(path, 16, 50)
        .with_context(|| format!("open batch {}", path.display()))?;
    let reader = BufReader::with_capacity(read_buf.max(8 * 1024), file);

    let mut rows: Vec<Row> = Vec::new();
    let mut observed: BTreeMap<String, BTreeSet<ColumnType>> = BTreeMap::new();
    let mut sidecar: Vec<(String, String)> = Vec::new();
    let mut skipped = 0u64;

    for line in reader.lines() {
        let line = line.with_context(|| format!("read batch {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let mut row: Row = match serde_json::from_str::<Value>(&line) {
            Ok(Value::Object(map)) => map,
            _ => {
                skipped += 1;
                continue;
            }
        };

        if let Some(extra) = row.remove(SIDECAR_COLUMN) {
            if !extra.is_null() {
                if let Some(id) = row.get("id").and_then(|v| v.as_str()) {
                    let payload = match extra {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    sidecar.push((id.to_string(), payload));
                }
            }
        }

        for (col, val) in row.iter() {
            let entry = observed.entry(col.clone()).or_default();
            if !val.is_null() {
                entry.insert(value_type(val));
            }
        }
        rows.push(row);
    }

    if skipped > 0 {
        tracing::warn!(path = %path.display(), "Skipped {} unparseable lines", skipped);
    }
    if rows.is_empty() {
        tracing::warn!(path = %path.display(), "Empty batch file");
    }

    let schema = observed
        .into_iter()
        .map(|(col, types)| {
            let ty = if types.is_empty() {
                ColumnType::Null
            } else {
                resolve_column_type(&types)
            };
            (col, ty)
        })
        .collect();

    Ok(Batch {
        path: path.to_path_buf(),
        rows,
        schema,
        sidecar,
        skipped_lines: skipped,
    })
}
