use rand::{Rng, rng};

use crate::{Result, WorkerIdProvider};

/// Draws a worker id uniformly from the layout's range.
///
/// Uses the thread-local RNG (`rand::rng()`), so no state is stored. Random
/// ids avoid coordination at the cost of a small collision chance between
/// instances; pair it with [`PrivateIpv4`] through
/// [`WorkerIdProvider::or_else`] to use it as a fallback only.
///
/// [`PrivateIpv4`]: crate::PrivateIpv4
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomWorkerId;

impl WorkerIdProvider for RandomWorkerId {
    fn worker_id(&self, max_worker_id: u64) -> Result<u64> {
        Ok(rng().random_range(0..=max_worker_id))
    }
}
