use crate::{Error, Result};

/// A source of the worker id a generator is built with.
///
/// The worker id keeps generators apart without coordination, so every
/// instance sharing an ID space must end up with a distinct value. The
/// generator validates the returned id against its layout; `max_worker_id` is
/// passed in so providers can draw from the right range.
///
/// Plain integers are providers of themselves.
///
/// # Example
///
/// ```
/// use trillium::WorkerIdProvider;
///
/// assert_eq!(7u64.worker_id(99_999).unwrap(), 7);
/// ```
pub trait WorkerIdProvider {
    /// Returns the worker id to use.
    ///
    /// # Errors
    ///
    /// Returns an error if no worker id can be supplied, for example
    /// [`Error::NoPrivateAddress`].
    fn worker_id(&self, max_worker_id: u64) -> Result<u64>;

    /// Falls back to `fallback` when this provider fails.
    fn or_else<F>(self, fallback: F) -> OrElse<Self, F>
    where
        Self: Sized,
        F: WorkerIdProvider,
    {
        OrElse {
            primary: self,
            fallback,
        }
    }
}

impl WorkerIdProvider for u64 {
    fn worker_id(&self, max_worker_id: u64) -> Result<u64> {
        if *self > max_worker_id {
            return Err(Error::InvalidWorkerId {
                worker_id: *self,
                max: max_worker_id,
            });
        }
        Ok(*self)
    }
}

impl<P: WorkerIdProvider + ?Sized> WorkerIdProvider for &P {
    fn worker_id(&self, max_worker_id: u64) -> Result<u64> {
        (**self).worker_id(max_worker_id)
    }
}

/// A provider that tries `primary` and, if it fails, `fallback`.
///
/// Built with [`WorkerIdProvider::or_else`].
#[derive(Clone, Debug)]
pub struct OrElse<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> WorkerIdProvider for OrElse<P, F>
where
    P: WorkerIdProvider,
    F: WorkerIdProvider,
{
    fn worker_id(&self, max_worker_id: u64) -> Result<u64> {
        match self.primary.worker_id(max_worker_id) {
            Ok(id) => Ok(id),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "worker id provider failed, using fallback");
                #[cfg(not(feature = "tracing"))]
                let _ = e;

                self.fallback.worker_id(max_worker_id)
            }
        }
    }
}
