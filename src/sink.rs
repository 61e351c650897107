//! Partitioned sink: append accepted raw records to one file per
//! (subreddit, year-month), creating directories on demand.

use crate::date::YearMonth;
use crate::util::append_with_backoff;
use ahash::AHashMap;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Routing key for one partition file. Many records map to the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartitionKey {
    pub subreddit: String, // lowercase
    pub ym: YearMonth,
}

impl PartitionKey {
    pub fn new(subreddit: &str, ts: i64) -> Self {
        Self {
            subreddit: subreddit.trim().to_lowercase(),
            ym: YearMonth::from_epoch(ts),
        }
    }
}

/// Append-only partitioned writers, created on demand.
///
/// Writes to the same partition are serialized behind a per-partition mutex;
/// writes to different partitions proceed independently. Rerunning over the
/// same archive appends duplicate lines: identity dedup happens downstream
/// in the merge stage, not here.
pub struct PartitionSink {
    root: PathBuf,
    write_buf: usize,
    writers: Mutex<AHashMap<PartitionKey, Arc<Mutex<BufWriter<File>>>>>,
}

impl PartitionSink {
    pub fn new(root: &Path, write_buf: usize) -> Result<Self> {
        fs::create_dir_all(root).with_context(|| format!("create sink root {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
            write_buf: write_buf.max(8 * 1024),
            writers: Mutex::new(AHashMap::new()),
        })
    }

    /// Partition file for `key`:
    /// `<root>/<subreddit>/<YYYY-MM>/<subreddit>_<YYYY-MM>.jsonl`.
    pub fn partition_path(&self, key: &PartitionKey) -> PathBuf {
        self.root
            .join(&key.subreddit)
            .join(key.ym.to_string())
            .join(format!("{}_{}.jsonl", key.subreddit, key.ym))
    }

    fn writer_for(&self, key: &PartitionKey) -> Result<Arc<Mutex<BufWriter<File>>>> {
        let mut map = self.writers.lock();
        if let Some(w) = map.get(key) {
            return Ok(w.clone());
        }
        let path = self.partition_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create partition dir for {}", path.display()))?;
        }
        let file = append_with_backoff(&path, 16, 50)
            .with_context(|| format!("open partition {}", path.display()))?;
        let w = Arc::new(Mutex::new(BufWriter::with_capacity(self.write_buf, file)));
        map.insert(key.clone(), w.clone());
        Ok(w)
    }

    /// Append one raw record (line terminator added here).
    pub fn write(&self, key: &PartitionKey, raw: &[u8]) -> Result<()> {
        let w = self.writer_for(key)?;
        let mut guard = w.lock();
        guard.write_all(raw)?;
        guard.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush_all(&self) -> Result<()> {
        let map = self.writers.lock();
        for w in map.values() {
            w.lock().flush()?;
        }
        Ok(())
    }
}
