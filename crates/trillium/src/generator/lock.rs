use core::{cmp::Ordering, fmt, time::Duration};
use std::{sync::Arc, thread, time::Instant};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Clock, Config, Error, IdGenStatus, MonotonicClock, Result, TrilliumId, WorkerIdProvider,
    generator::{Mutex, MutexGuard},
    id::nanos_to_duration,
};

/// A lock-based ID generator, safe to share across threads.
///
/// The generator owns its epoch and worker id, both immutable after
/// construction, and keeps the last issued ID behind a mutex. Every call takes
/// the lock, reads the clock, converts it into ticks since the epoch, and then
/// either adopts a newer tick (sequence back to zero) or bumps the sequence on
/// the last tick.
///
/// When the sequence of a tick is exhausted no ID is issued: polling returns
/// [`IdGenStatus::Pending`] with the exact time left until the next tick, and
/// the blocking/async entry points sleep that long outside the lock before
/// polling again. This caps throughput at `max_sequence + 1` IDs per tick.
///
/// Clones share the same state, so a clone handed to another thread keeps
/// issuing unique IDs.
///
/// The ID type picks the wire layout: [`PackedId`] (64-bit, 10 ms ticks) or
/// [`DecimalId`] (decimal string, 1 s ticks).
///
/// [`PackedId`]: crate::PackedId
/// [`DecimalId`]: crate::DecimalId
pub struct Generator<ID, C = MonotonicClock>
where
    ID: TrilliumId,
    C: Clock,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<Option<ID>>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<Option<ID>>>,
    epoch: Duration,
    worker_id: u64,
    clock: C,
}

impl<ID, C> Generator<ID, C>
where
    ID: TrilliumId,
    C: Clock,
{
    /// Creates a new generator for `worker_id`, counting ticks from `epoch`.
    ///
    /// `epoch` is a duration since the Unix epoch; see
    /// [`epoch_from_unix_secs`] for the `0` shorthand. No ID has been issued
    /// yet, so the first call always adopts the current tick with sequence
    /// `0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] if `worker_id` does not fit the ID
    /// layout.
    ///
    /// # Example
    ///
    /// ```
    /// use trillium::{DEFAULT_EPOCH, Generator, PackedId, SystemClock, TrilliumId};
    ///
    /// let generator = Generator::<PackedId, _>::new(DEFAULT_EPOCH, 42, SystemClock).unwrap();
    /// let id = generator.generate().unwrap();
    /// assert_eq!(id.worker_id(), 42);
    /// ```
    ///
    /// [`epoch_from_unix_secs`]: crate::epoch_from_unix_secs
    pub fn new(epoch: Duration, worker_id: u64, clock: C) -> Result<Self> {
        Self::with_state(epoch, worker_id, None, clock)
    }

    /// Creates a generator whose worker id comes from `provider`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error, or [`Error::InvalidWorkerId`] if the
    /// provided id does not fit the layout.
    pub fn with_provider<P>(epoch: Duration, provider: &P, clock: C) -> Result<Self>
    where
        P: WorkerIdProvider + ?Sized,
    {
        let worker_id = provider.worker_id(ID::max_worker_id())?;
        Self::new(epoch, worker_id, clock)
    }

    /// Creates a generator from a [`Config`].
    ///
    /// # Errors
    ///
    /// Fails like [`Generator::with_provider`].
    pub fn from_config(config: &Config, clock: C) -> Result<Self> {
        Self::with_provider(config.epoch(), &config.worker_id, clock)
    }

    /// Creates a generator that resumes after `last`, an ID it issued before.
    ///
    /// This is useful to restore state from persistent storage: IDs are never
    /// issued on a tick earlier than `last`, nor with a smaller sequence on
    /// the same tick.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] if `last` carries a worker id that
    /// does not fit the layout.
    pub fn from_components(epoch: Duration, last: ID, clock: C) -> Result<Self> {
        Self::with_state(epoch, last.worker_id(), Some(last), clock)
    }

    fn with_state(epoch: Duration, worker_id: u64, last: Option<ID>, clock: C) -> Result<Self> {
        let max = ID::max_worker_id();
        if worker_id > max {
            return Err(Error::InvalidWorkerId { worker_id, max });
        }
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(last))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(last)),
            epoch,
            worker_id,
            clock,
        })
    }

    /// The epoch ticks are counted from, as a duration since the Unix epoch.
    pub fn epoch(&self) -> Duration {
        self.epoch
    }

    /// The worker id encoded into every ID.
    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Attempts to generate the next available ID without blocking.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: a new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for })`: the sequence of the current
    ///   tick is exhausted; poll again after `yield_for`
    ///
    /// # Errors
    /// - [`Error::OverTimeLimit`] if the next tick does not fit the timestamp
    ///   field
    /// - [`Error::ClockBeforeEpoch`] if the clock reads earlier than the epoch
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (std mutex only)
    ///
    /// # Example
    /// ```
    /// use trillium::{DEFAULT_EPOCH, Generator, IdGenStatus, PackedId, SystemClock};
    ///
    /// let generator = Generator::<PackedId, _>::new(DEFAULT_EPOCH, 0, SystemClock).unwrap();
    ///
    /// let id = loop {
    ///     match generator.try_poll() {
    ///         Ok(IdGenStatus::Ready { id }) => break id,
    ///         Ok(IdGenStatus::Pending { yield_for }) => std::thread::sleep(yield_for),
    ///         Err(e) => panic!("Generator error: {e}"),
    ///     }
    /// };
    /// # let _ = id;
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll(&self) -> Result<IdGenStatus<ID>> {
        // The clock is read under the lock, so a tick adopted by another
        // caller is never newer than this reading.
        let mut state = self.lock()?;
        let elapsed = self.elapsed()?;
        let now = Self::tick_of(elapsed);

        let status = match *state {
            None => IdGenStatus::Ready {
                id: self.adopt(now)?,
            },
            Some(last) => match now.cmp(&last.timestamp()) {
                Ordering::Greater => {
                    Self::check_timestamp(now)?;
                    IdGenStatus::Ready {
                        id: last.rollover_to_timestamp(now),
                    }
                }
                Ordering::Equal => Self::advance_sequence(last, elapsed)?,
                Ordering::Less => Self::cold_clock_behind(last, now, elapsed)?,
            },
        };

        if let IdGenStatus::Ready { id } = status {
            *state = Some(id);
        }
        Ok(status)
    }

    /// Generates the next ID, sleeping the calling thread while the sequence
    /// of the current tick is exhausted.
    ///
    /// The lock is not held while sleeping, and the clock is read again after
    /// waking, so no ID is ever issued ahead of its tick.
    ///
    /// # Errors
    ///
    /// Fails like [`Generator::try_poll`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self) -> Result<ID> {
        loop {
            match self.try_poll()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_for } => thread::sleep(yield_for),
            }
        }
    }

    /// Like [`Generator::generate`], but gives up once waiting for the next
    /// tick would run past `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] instead of waiting past the deadline, and
    /// otherwise fails like [`Generator::try_poll`].
    pub fn generate_timeout(&self, timeout: Duration) -> Result<ID> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.generate_until(deadline),
            None => self.generate(),
        }
    }

    /// Like [`Generator::generate`], but gives up once waiting for the next
    /// tick would run past `deadline`.
    ///
    /// An ID that is available right away is returned even if `deadline` has
    /// already passed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] instead of waiting past the deadline, and
    /// otherwise fails like [`Generator::try_poll`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate_until(&self, deadline: Instant) -> Result<ID> {
        loop {
            match self.try_poll()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_for } => {
                    let wake = Instant::now().checked_add(yield_for);
                    if wake.is_none_or(|wake| wake > deadline) {
                        return Err(Error::Timeout);
                    }
                    thread::sleep(yield_for);
                }
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<ID>>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    fn elapsed(&self) -> Result<Duration> {
        let now = self.clock.now();
        now.checked_sub(self.epoch)
            .ok_or_else(|| Error::ClockBeforeEpoch {
                behind: self.epoch - now,
            })
    }

    fn tick_of(elapsed: Duration) -> u64 {
        u64::try_from(elapsed.as_nanos() / ID::TICK.as_nanos()).unwrap_or(u64::MAX)
    }

    fn check_timestamp(tick: u64) -> Result<()> {
        let max = ID::max_timestamp();
        if tick > max {
            return Err(Error::OverTimeLimit { tick, max });
        }
        Ok(())
    }

    fn adopt(&self, tick: u64) -> Result<ID> {
        Self::check_timestamp(tick)?;
        Ok(ID::from_components(tick, self.worker_id, 0))
    }

    fn advance_sequence(last: ID, elapsed: Duration) -> Result<IdGenStatus<ID>> {
        if last.has_sequence_room() {
            return Ok(IdGenStatus::Ready {
                id: last.increment_sequence(),
            });
        }

        // The quota of `last`'s tick is spent; only the next tick may issue.
        let next = last.timestamp().saturating_add(1);
        Self::check_timestamp(next)?;

        let target = ID::TICK.as_nanos() * u128::from(next);
        let yield_for = nanos_to_duration(target.saturating_sub(elapsed.as_nanos()));

        #[cfg(feature = "tracing")]
        tracing::debug!(tick = last.timestamp(), ?yield_for, "sequence exhausted");

        Ok(IdGenStatus::Pending { yield_for })
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last: ID, now: u64, elapsed: Duration) -> Result<IdGenStatus<ID>> {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            last_tick = last.timestamp(),
            now_tick = now,
            "clock moved backward, continuing on the last tick"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = now;

        Self::advance_sequence(last, elapsed)
    }
}

impl<ID, C> Clone for Generator<ID, C>
where
    ID: TrilliumId,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            epoch: self.epoch,
            worker_id: self.worker_id,
            clock: self.clock.clone(),
        }
    }
}

impl<ID, C> fmt::Debug for Generator<ID, C>
where
    ID: TrilliumId,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("epoch", &self.epoch)
            .field("worker_id", &self.worker_id)
            .finish_non_exhaustive()
    }
}
