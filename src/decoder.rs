//! Streaming zstd decoder: turns a block-compressed archive into logical
//! newline-delimited records without materializing the decompressed stream.

use anyhow::Result;
use std::io::{self, Read};
use std::path::Path;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use zstd::stream::read::Decoder;

use crate::util::open_with_backoff;

/// A `Read` wrapper that counts compressed bytes consumed.
struct CountingReader<R: Read> {
    inner: R,
    count: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Stream one archive record-by-record. Decompressed bytes are pulled in
/// `block_bytes` chunks into a rolling buffer; each complete `\n`-terminated
/// line is handed to `on_record` without its terminator (a trailing `\r` is
/// stripped too). A non-empty, whitespace-trimmed trailing fragment at EOF is
/// emitted as a final record, so archives without a trailing newline lose
/// nothing. `on_progress` receives compressed-byte deltas.
///
/// We request `window_log_max(31)` up front to avoid "Frame requires too much
/// memory" on very large frames. Corruption fails the whole file: the error
/// is returned to the caller, which decides whether the run continues.
pub fn stream_records(
    path: &Path,
    block_bytes: usize,
    mut on_progress: impl FnMut(u64),
    mut on_record: impl FnMut(&[u8]) -> Result<()>,
) -> Result<()> {
    let file = open_with_backoff(path, 16, 50)?;
    let counter = Arc::new(AtomicU64::new(0));
    let counting = CountingReader { inner: file, count: counter.clone() };

    let mut decoder = Decoder::new(counting)?;
    decoder.window_log_max(31)?;

    let block = block_bytes.max(8 * 1024);
    let mut chunk = vec![0u8; block];
    let mut buf: Vec<u8> = Vec::with_capacity(block);
    let mut reported = 0u64;

    loop {
        let n = decoder.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let mut start = 0usize;
        while let Some(rel) = buf[start..].iter().position(|&b| b == b'\n') {
            let mut end = start + rel;
            if end > start && buf[end - 1] == b'\r' {
                end -= 1;
            }
            on_record(&buf[start..end])?;
            start += rel + 1;
        }
        buf.drain(..start);

        let seen = counter.load(Ordering::Relaxed);
        if seen > reported {
            on_progress(seen - reported);
            reported = seen;
        }
    }

    let tail = trim_ascii_ws(&buf);
    if !tail.is_empty() {
        on_record(tail)?;
    }

    let seen = counter.load(Ordering::Relaxed);
    if seen > reported {
        on_progress(seen - reported);
    }
    Ok(())
}

fn trim_ascii_ws(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

// ----------------------------- Integrity checks ----------------------------------

/// QUICK check: attempt to decode up to `max_decompressed_bytes` and stop.
/// Fast and catches early corruption; cannot detect late/trailing corruption.
pub fn quick_validate(path: &Path, max_decompressed_bytes: u64) -> Result<()> {
    let file = open_with_backoff(path, 16, 50)?;
    let mut decoder = Decoder::new(file)?;
    decoder.window_log_max(31)?;
    let mut limited = decoder.take(max_decompressed_bytes);
    // Discard output; we only care about whether decoding produces an error.
    io::copy(&mut limited, &mut io::sink())?;
    Ok(())
}

/// FULL check: decode the entire stream to EOF (validates checksums).
pub fn full_validate(path: &Path) -> Result<()> {
    let file = open_with_backoff(path, 16, 50)?;
    let mut decoder = Decoder::new(file)?;
    decoder.window_log_max(31)?;
    io::copy(&mut decoder, &mut io::sink())?;
    Ok(())
}
