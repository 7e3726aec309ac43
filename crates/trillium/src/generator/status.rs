use core::time::Duration;

use crate::TrilliumId;

/// Represents the result of polling a generator for a new ID.
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the sequence is exhausted for the current
///   tick and no ID can be issued until the next tick begins.
///
/// This allows non-blocking generation loops and clean backoff strategies.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use trillium::{Clock, Generator, IdGenStatus, PackedId};
///
/// struct FixedTime;
/// impl Clock for FixedTime {
///     fn now(&self) -> Duration {
///         Duration::from_secs(1_000_000_000)
///     }
/// }
///
/// let generator = Generator::<PackedId, _>::new(Duration::ZERO, 1, FixedTime).unwrap();
/// match generator.try_poll().unwrap() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("Back off for {yield_for:?}"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus<ID: TrilliumId> {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: ID,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current tick.
    Pending {
        /// Time left until the next tick begins, according to the clock that
        /// was read for this poll.
        yield_for: Duration,
    },
}
