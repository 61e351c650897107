//! Reconciliation engine: batch load -> global type resolution -> coercion ->
//! merge/dedup -> sidecar rejoin -> canonicalize -> atomic canonical write.
//!
//! The resolution step is a synchronization barrier: coercion cannot start
//! until every batch's schema has been observed, because a column's target
//! type is defined relative to the union of all batches.

use crate::batch::{load_batch, Batch, Row};
use crate::canonical::{canonicalize, TextCleaner};
use crate::coerce::{coerce_batch, CoerceStats};
use crate::config::PipelineConfig;
use crate::jsonl::JsonlWriter;
use crate::merge::merge_dedup;
use crate::paths::discover_batches;
use crate::progress::make_count_progress;
use crate::schema::{resolve_schemas, ColumnType};
use crate::sidecar::{collect_payloads, rejoin, SIDECAR_COLUMN};
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregate outcome of one reconciliation run.
#[derive(Clone, Debug, Default)]
pub struct ReconcileReport {
    pub batches_read: u64,
    pub batches_failed: u64,
    pub rows_in: u64,
    pub rows_out: u64,
    pub duplicates_removed: u64,
    pub conflicted_columns: u64,
    pub coercion_fallback_cells: u64,
    pub by_subreddit: BTreeMap<String, u64>,
}

pub struct Reconciler {
    cfg: PipelineConfig,
}

impl Reconciler {
    pub fn new(cfg: PipelineConfig) -> Self {
        Self { cfg }
    }

    pub fn run(&self) -> Result<ReconcileReport> {
        init_tracing_once();
        if let Some(n) = self.cfg.parallelism {
            if n > 0 {
                let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
            }
        }

        let mut report = ReconcileReport::default();

        let files = discover_batches(&self.cfg.bronze_dir);
        if files.is_empty() {
            tracing::warn!(dir = %self.cfg.bronze_dir.display(), "No batch files found; nothing to reconcile");
            return Ok(report);
        }
        tracing::info!("Reading {} batch files...", files.len());

        // Phase 1: load every batch (schema discovery per batch is
        // independent, so reads may run in parallel).
        let pb = if self.cfg.progress {
            Some(make_count_progress(files.len() as u64, "Loading batches"))
        } else {
            None
        };
        let loaded: Mutex<Vec<(usize, Batch)>> = Mutex::new(Vec::with_capacity(files.len()));
        let failed = AtomicU64::new(0);
        let indexed: Vec<(usize, PathBuf)> = files.into_iter().enumerate().collect();

        crate::concurrency::for_each_limited(&indexed, self.cfg.file_concurrency, |(i, path)| {
            match load_batch(path, self.cfg.read_block_bytes) {
                Ok(b) => loaded.lock().push((*i, b)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable batch");
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            Ok(())
        })?;
        if let Some(pb) = &pb {
            pb.finish_with_message("loaded");
        }

        let mut batches: Vec<Batch> = {
            let mut v = loaded.into_inner();
            v.sort_by_key(|(i, _)| *i);
            v.into_iter().map(|(_, b)| b).collect()
        };
        report.batches_read = batches.len() as u64;
        report.batches_failed = failed.load(Ordering::Relaxed);

        if batches.is_empty() {
            tracing::error!("No batch files could be read");
            return Ok(report);
        }

        // Barrier: global type resolution over the union of observed schemas.
        let mut observed: BTreeMap<String, BTreeSet<ColumnType>> = BTreeMap::new();
        for b in &batches {
            for (col, ty) in &b.schema {
                observed.entry(col.clone()).or_default().insert(*ty);
            }
        }
        if observed.is_empty() {
            tracing::warn!("Batches carried no columns; nothing to write");
            return Ok(report);
        }
        report.conflicted_columns = observed.values().filter(|s| s.len() > 1).count() as u64;
        let mut resolved = resolve_schemas(&observed);

        // Phase 2: coercion is per-batch independent once resolution is fixed.
        let stats: Mutex<CoerceStats> = Mutex::new(CoerceStats::default());
        if self.cfg.file_concurrency <= 1 {
            for b in batches.iter_mut() {
                let s = coerce_batch(b, &resolved);
                stats.lock().merge(s);
            }
        } else {
            batches.par_iter_mut().for_each(|b| {
                let s = coerce_batch(b, &resolved);
                stats.lock().merge(s);
            });
        }
        let stats = stats.into_inner();
        stats.log();
        report.coercion_fallback_cells = stats.total();

        // Sidecar payloads leave before the merge and rejoin after dedup.
        let payloads = collect_payloads(batches.iter_mut().map(|b| std::mem::take(&mut b.sidecar)));
        if !payloads.is_empty() {
            tracing::info!("Preserved {} sidecar payloads", payloads.len());
            resolved.insert(SIDECAR_COLUMN.to_string(), ColumnType::Str);
        }

        let (mut rows, merge_stats) = merge_dedup(batches);
        report.rows_in = merge_stats.rows_in;
        report.duplicates_removed = merge_stats.duplicates_removed;
        if merge_stats.rows_without_id > 0 {
            tracing::warn!("Dropped {} rows with no usable id", merge_stats.rows_without_id);
        }
        if merge_stats.duplicates_removed > 0 {
            tracing::info!("Removed {} duplicate ids", merge_stats.duplicates_removed);
        }

        rejoin(&mut rows, &payloads, SIDECAR_COLUMN);

        let cleaner = TextCleaner::new();
        canonicalize(&mut rows, &resolved, &cleaner);

        report.rows_out = rows.len() as u64;
        for row in &rows {
            if let Some(s) = row.get("subreddit_nombre").and_then(|v| v.as_str()) {
                *report.by_subreddit.entry(s.to_string()).or_insert(0) += 1;
            }
        }

        self.write_canonical(&rows)?;

        tracing::info!(
            "Reconciliation complete: {} batches ({} failed), {} rows in, {} rows out, {} duplicates removed",
            report.batches_read,
            report.batches_failed,
            report.rows_in,
            report.rows_out,
            report.duplicates_removed
        );
        for (sub, n) in &report.by_subreddit {
            let pct = if report.rows_out > 0 {
                *n as f64 * 100.0 / report.rows_out as f64
            } else {
                0.0
            };
            tracing::info!("   {}: {} posts ({:.1}%)", sub, n, pct);
        }
        Ok(report)
    }

    /// Overwrite semantics: the canonical artifact is staged to a temp file
    /// and promoted atomically, so an interrupted run never leaves a
    /// half-written dataset behind.
    fn write_canonical(&self, rows: &[Row]) -> Result<()> {
        let out = &self.cfg.silver_path;
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
        let tmp = out.with_extension("ndjson.inprogress");
        let mut w = JsonlWriter::create(&tmp, self.cfg.write_buffer_bytes)
            .with_context(|| format!("create {}", tmp.display()))?;
        for row in rows {
            w.write_line(row)?;
        }
        w.finish_atomic(out)?;
        tracing::info!("Wrote {} canonical records to {}", rows.len(), out.display());
        Ok(())
    }
}
