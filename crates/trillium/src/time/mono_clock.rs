use crate::Clock;
use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A monotonic clock anchored to the wall time observed at construction.
///
/// The wall time is read once; afterwards the clock only advances with a
/// monotonic timer (`Instant`), so it never goes backward even if the system
/// clock is adjusted externally (NTP, manual changes).
///
/// Internally a background thread bumps a shared atomic counter once per
/// millisecond, which keeps syscalls off the hot path. Clones share the same
/// ticker; the thread exits once the last clone is dropped.
///
/// Resolution is one millisecond, finer than any shipped tick.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    anchor: Duration,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Starts a new ticker anchored to the current wall time.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use trillium::{Clock, MonotonicClock};
    ///
    /// let clock = MonotonicClock::new();
    /// let before = clock.now();
    /// std::thread::sleep(Duration::from_millis(5));
    ///
    /// // The ticker may lag a millisecond behind, but never goes backward.
    /// assert!(clock.now() >= before);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let start = Instant::now();
        let anchor = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Compute the absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                // Sleep if we are early
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                #[allow(clippy::cast_possible_truncation)]
                let now_ms = start.elapsed().as_millis() as u64;

                // Monotonic store, aligned to elapsed milliseconds since start
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                tick = now_ms + 1;
            }
        });

        // Freshly created, so the cell is always empty here.
        let _ = inner._handle.set(handle);

        Self { inner, anchor }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.anchor + Duration::from_millis(self.inner.current.load(Ordering::Relaxed))
    }
}
