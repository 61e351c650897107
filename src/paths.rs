//! Input discovery: compressed archives for the filter pipeline and NDJSON
//! batch files for the reconciliation engine.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// All `.zst` archives under `root`, recursively, in sorted order.
pub fn discover_archives(root: &Path) -> Vec<PathBuf> {
    discover_by_ext(root, &["zst"])
}

/// All NDJSON batch files under `root`, recursively, in sorted order.
/// Sorted paths keep batch iteration deterministic across platforms.
pub fn discover_batches(root: &Path) -> Vec<PathBuf> {
    discover_by_ext(root, &["jsonl", "ndjson"])
}

fn discover_by_ext(root: &Path, exts: &[&str]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    if !root.exists() {
        return found;
    }
    for entry in WalkDir::new(root).min_depth(1) {
        if let Ok(ent) = entry {
            if !ent.file_type().is_file() {
                continue;
            }
            if let Some(ext) = ent.path().extension().and_then(|e| e.to_str()) {
                if exts.iter().any(|x| ext.eq_ignore_ascii_case(x)) {
                    found.push(ent.path().to_path_buf());
                }
            }
        }
    }
    found.sort();
    found
}
