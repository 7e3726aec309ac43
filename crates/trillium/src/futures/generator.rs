#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Clock, Generator, IdGenStatus, Result, SleepProvider, TrilliumId};

impl<ID, C> Generator<ID, C>
where
    ID: TrilliumId,
    C: Clock,
{
    /// Generates the next ID, awaiting `S` while the sequence of the current
    /// tick is exhausted.
    ///
    /// The lock is never held across an await point. Dropping the future
    /// while it sleeps consumes nothing.
    ///
    /// # Errors
    ///
    /// Fails like [`Generator::try_poll`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub async fn try_generate_async<S>(&self) -> Result<ID>
    where
        S: SleepProvider,
    {
        loop {
            let yield_for = match self.try_poll()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_for } => yield_for,
            };
            S::sleep_for(yield_for).await;
        }
    }
}
