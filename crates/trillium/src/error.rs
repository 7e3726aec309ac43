/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `trillium` can emit.
///
/// Variants fall into three groups:
/// - configuration errors ([`Error::InvalidWorkerId`], [`Error::Config`]) are
///   raised while building a generator and are fatal for that generator;
/// - [`Error::OverTimeLimit`] and [`Error::ClockBeforeEpoch`] are raised per
///   call when the clock cannot be encoded into the ID layout;
/// - [`Error::Timeout`] and [`Error::Cancelled`] report that the caller gave up
///   on a wait. No sequence value is consumed when these are returned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The worker id does not fit the layout's worker field.
    #[error("trillium: invalid worker id {worker_id} (max = {max})")]
    InvalidWorkerId {
        /// The rejected worker id.
        worker_id: u64,
        /// The largest worker id the layout can encode.
        max: u64,
    },

    /// The elapsed time since the epoch no longer fits the timestamp field.
    ///
    /// This is terminal for the generator: retrying only yields larger ticks.
    #[error("trillium: over the time limit (tick {tick} > max {max})")]
    OverTimeLimit {
        /// The tick that could not be encoded.
        tick: u64,
        /// The largest tick the layout can encode.
        max: u64,
    },

    /// The clock reads earlier than the generator's epoch.
    #[error("trillium: clock is {behind:?} behind the epoch")]
    ClockBeforeEpoch {
        /// How far the clock is behind the epoch.
        behind: core::time::Duration,
    },

    /// No private IPv4 address could be used to derive a worker id.
    #[error("trillium: no private ip address")]
    NoPrivateAddress,

    /// The wait for the next tick would run past the caller's deadline.
    #[error("trillium: sequence exhausted and the deadline would pass")]
    Timeout,

    /// The caller cancelled while waiting for the next tick.
    #[error("trillium: cancelled while waiting for the next tick")]
    Cancelled,

    /// The generator lock was poisoned by a panicking thread.
    ///
    /// `parking_lot` mutexes do not poison, so this variant only exists when
    /// the `parking-lot` feature is disabled.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("trillium: generator lock poisoned")]
    LockPoisoned,

    /// A configuration value could not be read or parsed.
    #[error("trillium: invalid config value for {key}: {reason}")]
    Config {
        /// The configuration key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A textual ID could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseIdError),
}

/// Errors that can occur while parsing an ID from its textual form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ParseIdError {
    /// The input was empty.
    #[error("empty id")]
    Empty,

    /// A decimal ID needs at least one timestamp digit on top of the fixed
    /// worker id and sequence fields.
    #[error("id has {len} digits, expected more than {min}")]
    TooShort {
        /// Number of digits found.
        len: usize,
        /// Digits taken by the fixed-width fields.
        min: usize,
    },

    /// The input contained something other than ascii digits.
    #[error("id contains a non-digit character")]
    InvalidDigit,

    /// The value does not fit the backing integer.
    #[error("id overflows its integer representation")]
    Overflow,

    /// The decoded integer sets bits outside the layout's fields.
    #[error("id {raw} sets reserved bits")]
    ReservedBitsSet {
        /// The decoded integer.
        raw: u64,
    },
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
