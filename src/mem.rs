use parking_lot::Mutex;
use std::time::{Duration, Instant};
use sysinfo::{System, SystemExt};

const REFRESH_EVERY: Duration = Duration::from_millis(500);

/// Low-overhead memory gauge owned by a pipeline run.
/// Refreshes at most every `REFRESH_EVERY`; uses available/total RAM to
/// decide when streaming loops should yield.
pub struct MemoryWatcher {
    inner: Mutex<Gauge>,
    threshold: f64,
}

struct Gauge {
    sys: System,
    last_check: Instant,
    last_frac: f64, // available / total (0.0..1.0)
}

impl MemoryWatcher {
    pub fn new(threshold: f64) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            inner: Mutex::new(Gauge {
                sys,
                last_check: Instant::now() - REFRESH_EVERY * 2,
                last_frac: 1.0,
            }),
            threshold,
        }
    }

    /// Recent estimate of available memory as a fraction of total (0.0..1.0).
    pub fn available_fraction(&self) -> f64 {
        let mut g = self.inner.lock();
        let now = Instant::now();
        if now.duration_since(g.last_check) >= REFRESH_EVERY {
            g.sys.refresh_memory();
            let total = g.sys.total_memory() as f64;
            let avail = g.sys.available_memory() as f64;
            g.last_frac = if total > 0.0 { (avail / total).clamp(0.0, 1.0) } else { 1.0 };
            g.last_check = now;
        }
        g.last_frac
    }

    pub fn is_low(&self) -> bool {
        self.available_fraction() < self.threshold
    }

    /// Cooperative backoff; cheap to call per record.
    pub fn throttle(&self) {
        if self.is_low() {
            std::thread::sleep(Duration::from_millis(25));
        }
    }
}
