use tokio_util::sync::CancellationToken;

use crate::{Clock, Error, Generator, IdGenStatus, Result, TokioSleep, TrilliumId};

impl<ID, C> Generator<ID, C>
where
    ID: TrilliumId,
    C: Clock,
{
    /// Generates the next ID on the [`tokio`](https://docs.rs/tokio) runtime.
    ///
    /// Shorthand for [`Generator::try_generate_async`] with [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// Fails like [`Generator::try_poll`].
    pub async fn generate_async(&self) -> Result<ID> {
        self.try_generate_async::<TokioSleep>().await
    }

    /// Generates the next ID, giving up if `token` is cancelled while waiting
    /// for the next tick.
    ///
    /// An ID that is available right away is returned even if `token` is
    /// already cancelled; cancellation only interrupts a wait.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the token fires during a wait, and
    /// otherwise fails like [`Generator::try_poll`].
    pub async fn generate_cancellable(&self, token: &CancellationToken) -> Result<ID> {
        loop {
            let yield_for = match self.try_poll()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_for } => yield_for,
            };
            tokio::select! {
                biased;
                () = token.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(yield_for) => {}
            }
        }
    }
}
