use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered NDJSON writer with atomic promotion, for overwrite-semantics
/// outputs that must never be observed half-written.
pub struct JsonlWriter {
    path: PathBuf,
    w: Option<BufWriter<File>>,
}

impl JsonlWriter {
    pub fn create(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = create_with_backoff(path, 16, 50)?;
        Ok(Self {
            path: path.to_path_buf(),
            w: Some(BufWriter::with_capacity(buf_bytes.max(8 * 1024), f)),
        })
    }

    /// Serialize one value as a single NDJSON line.
    pub fn write_line<T: serde::Serialize>(&mut self, value: &T) -> Result<()> {
        if let Some(w) = &mut self.w {
            serde_json::to_writer(&mut *w, value)?;
            w.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Flushes and atomically promotes the temp file to `final_path`.
    pub fn finish_atomic(mut self, final_path: &Path) -> Result<()> {
        if let Some(mut w) = self.w.take() {
            w.flush().with_context(|| format!("flush {}", self.path.display()))?;
        }
        replace_file_atomic_backoff(&self.path, final_path)
    }
}
