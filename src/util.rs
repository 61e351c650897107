//! Robust file primitives shared by both pipelines: open/create/append with
//! retry for transient errors, atomic replacement, and tracing setup.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

/// Return true for transient/retriable I/O errors often seen on Windows when
/// filter drivers (AV/backup), USB/NAS volumes, or sharing violations occur.
fn is_retriable_io_error(e: &io::Error) -> bool {
    match e.raw_os_error() {
        // Common Windows transient codes:
        //   5   = Access is denied (often AV/share)
        //   21  = Device not ready
        //   32  = Sharing violation
        //   33  = Lock violation
        //   225 = AV/PUA blocked file
        //   433 = A device which does not exist was specified
        //   1006= Volume externally altered; handle invalid
        //   1117= I/O device error
        //   1224= Operation not possible with a user-mapped section open
        Some(5) | Some(21) | Some(32) | Some(33) | Some(225) |
        Some(433) | Some(1006) | Some(1117) | Some(1224) => true,
        _ => false,
    }
}

fn retry_io<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let tries = tries.max(1);
    let mut last_err: Option<io::Error> = None;
    for i in 0..tries {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "io retries exhausted")))
}

/// Open a file with retries/backoff for transient errors.
pub fn open_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    retry_io(tries, delay_ms, || File::open(path))
}

/// Create (truncate) a file with retries/backoff for transient errors.
pub fn create_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    retry_io(tries, delay_ms, || File::create(path))
}

/// Open in append mode, creating the file if needed.
pub fn append_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    retry_io(tries, delay_ms, || {
        OpenOptions::new().create(true).append(true).open(path)
    })
}

/// Remove a file with retries/backoff. Succeeds if the file doesn't exist.
pub fn remove_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> Result<()> {
    retry_io(tries, delay_ms, || match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    })
    .with_context(|| format!("remove {}", path.display()))
}

/// Atomically replace `dest` with `tmp` (Windows-friendly).
/// If rename fails (e.g., due to sharing), fall back to copy+remove.
pub fn replace_file_atomic_backoff(tmp: &Path, dest: &Path) -> Result<()> {
    let tries = 20usize;
    let delay_ms = 50u64;
    if dest.exists() {
        remove_with_backoff(dest, tries, delay_ms)?;
    }
    match retry_io(tries, delay_ms, || fs::rename(tmp, dest)) {
        Ok(_) => Ok(()),
        Err(_) => {
            retry_io(tries, delay_ms, || fs::copy(tmp, dest).map(|_| ()))
                .with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
            remove_with_backoff(tmp, tries, delay_ms)?;
            Ok(())
        }
    }
}
