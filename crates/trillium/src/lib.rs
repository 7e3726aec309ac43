//! Coordination-free, roughly time-ordered unique IDs.
//!
//! Every ID is built from a coarse timestamp (ticks since a configurable
//! epoch), a worker id that distinguishes concurrent generators, and a
//! sequence that distinguishes IDs issued within the same tick.
//!
//! Two layouts ship with the crate:
//! - [`PackedId`]: a 64-bit integer with 10 ms ticks, 256 IDs per tick, and
//!   65 536 workers. Custom layouts are declared with [`define_packed_id!`].
//! - [`DecimalId`]: a decimal string with 1 s ticks and five-digit worker id
//!   and sequence fields.
//!
//! A [`Generator`] issues IDs for one worker. It is cheap to clone and safe to
//! share across threads; when a tick's sequence is exhausted it waits for the
//! next tick instead of issuing a duplicate.
//!
//! ```
//! use trillium::{DEFAULT_EPOCH, Generator, MonotonicClock, PackedId, TrilliumId};
//!
//! let generator = Generator::<PackedId>::new(DEFAULT_EPOCH, 7, MonotonicClock::default())?;
//! let a = generator.generate()?;
//! let b = generator.generate()?;
//! assert!(a < b);
//! assert_eq!(b.worker_id(), 7);
//! # Ok::<(), trillium::Error>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
#[cfg(feature = "futures")]
mod futures;
mod generator;
mod id;
#[cfg(feature = "serde")]
mod serialization;
mod time;
mod worker;

pub use crate::config::*;
pub use crate::error::*;
#[cfg(feature = "futures")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub use crate::serialization::*;
pub use crate::time::*;
pub use crate::worker::*;
