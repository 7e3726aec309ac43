use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Default epoch: Monday, July 13, 1998 00:00:00 UTC (Unix `900288000`).
///
/// Passing `0` to [`epoch_from_unix_secs`] selects this epoch.
pub const DEFAULT_EPOCH: Duration = Duration::from_secs(900_288_000);

/// Converts Unix seconds into an epoch, mapping `0` to [`DEFAULT_EPOCH`].
///
/// Every instance sharing an ID space must agree on the epoch, and it must not
/// change after deployment.
///
/// ```
/// use core::time::Duration;
/// use trillium::{epoch_from_unix_secs, DEFAULT_EPOCH};
///
/// assert_eq!(epoch_from_unix_secs(0), DEFAULT_EPOCH);
/// assert_eq!(epoch_from_unix_secs(1_598_918_400), Duration::from_secs(1_598_918_400));
/// ```
#[must_use]
pub const fn epoch_from_unix_secs(secs: u64) -> Duration {
    if secs == 0 {
        DEFAULT_EPOCH
    } else {
        Duration::from_secs(secs)
    }
}

/// A source of the current wall-clock time.
///
/// This abstraction allows you to plug in the system clock, a monotonic
/// clock, or a mocked time source in tests. The generator subtracts its own
/// epoch, so clocks only report time since the Unix epoch.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use trillium::Clock;
///
/// struct FixedTime;
/// impl Clock for FixedTime {
///     fn now(&self) -> Duration {
///         Duration::from_secs(1_000_000_000)
///     }
/// }
///
/// assert_eq!(FixedTime.now().as_secs(), 1_000_000_000);
/// ```
pub trait Clock {
    /// Returns the time elapsed since 1970-01-01 00:00:00 UTC.
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// A clock that asks the operating system for the wall time on every call.
///
/// Wall time can jump backward (NTP corrections, manual changes). The
/// generator never issues a smaller tick when that happens, but it keeps
/// counting sequences on its last tick until the clock catches up. Prefer
/// [`MonotonicClock`] for long-running services.
///
/// [`MonotonicClock`]: crate::MonotonicClock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        // A clock set before 1970 reads as the Unix epoch itself; the
        // generator then reports it as behind its own epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}
