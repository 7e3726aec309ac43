use core::{fmt, hash::Hash, time::Duration};

/// A time-ordered identifier built from a tick count, a worker id, and a
/// per-tick sequence.
///
/// Implementors fix the tick unit ([`TrilliumId::TICK`]) and the width of each
/// field, so the choice of ID type is also the choice of wire layout for a
/// deployment.
///
/// # Example
///
/// ```
/// use trillium::{PackedId, TrilliumId};
///
/// let id = PackedId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.worker_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// ```
pub trait TrilliumId:
    Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash
{
    /// Length of one tick of the timestamp field.
    const TICK: Duration;

    /// Returns the timestamp portion of the ID, in ticks since the epoch.
    fn timestamp(&self) -> u64;

    /// Returns the worker id portion of the ID.
    fn worker_id(&self) -> u64;

    /// Returns the sequence portion of the ID.
    fn sequence(&self) -> u64;

    /// Returns the largest encodable timestamp.
    fn max_timestamp() -> u64;

    /// Returns the largest encodable worker id.
    fn max_worker_id() -> u64;

    /// Returns the largest encodable sequence.
    fn max_sequence() -> u64;

    /// Constructs an ID from its components.
    ///
    /// Components are truncated to their field widths; callers are expected to
    /// stay within the `max_*` bounds.
    fn from_components(timestamp: u64, worker_id: u64, sequence: u64) -> Self;

    /// Returns `true` if every field holds a value its layout can represent.
    fn is_valid(&self) -> bool;

    /// Returns true if the current sequence value can be incremented.
    fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// Returns a new ID with the sequence incremented.
    fn increment_sequence(&self) -> Self {
        Self::from_components(self.timestamp(), self.worker_id(), self.sequence() + 1)
    }

    /// Returns a new ID for a newer timestamp with sequence reset to zero.
    fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.worker_id(), 0)
    }

    /// Returns the time elapsed between the epoch and the start of this ID's
    /// tick.
    fn elapsed(&self) -> Duration {
        nanos_to_duration(Self::TICK.as_nanos() * u128::from(self.timestamp()))
    }

    /// Returns the start of this ID's tick as a duration since the Unix epoch,
    /// given the `epoch` the generating instance was configured with.
    fn unix_time(&self, epoch: Duration) -> Duration {
        epoch.saturating_add(self.elapsed())
    }
}

/// Converts a nanosecond count into a [`Duration`], saturating at
/// [`Duration::MAX`].
pub(crate) fn nanos_to_duration(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    match u64::try_from(nanos / NANOS_PER_SEC) {
        #[allow(clippy::cast_possible_truncation)]
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}
