use core::{fmt, num::TryFromIntError, str::FromStr, time::Duration};

use crate::{ParseIdError, TrilliumId};

/// A decimal-concatenation identifier: `{elapsed seconds}{worker id:05}{sequence:05}`.
///
/// The worker id and sequence are fixed-width, zero-padded, five-digit fields.
/// The leading timestamp field has no fixed width and grows with time, so the
/// digit length of the rendered ID grows too; consumers must only rely on the
/// last ten digits having a fixed layout.
///
/// - 1 s ticks
/// - worker ids in `0..=99_999`
/// - sequences in `0..=99_999` (100 000 IDs per second per worker)
///
/// Ordering compares timestamp, then worker id, then sequence, which matches
/// the numeric ordering of [`DecimalId::to_u128`].
///
/// # Example
///
/// ```
/// use trillium::{DecimalId, TrilliumId};
///
/// let id = DecimalId::from_components(123, 42, 7);
/// assert_eq!(id.to_string(), "1230004200007");
/// assert_eq!("1230004200007".parse::<DecimalId>().unwrap(), id);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DecimalId {
    timestamp: u64,
    worker_id: u32,
    sequence: u32,
}

impl DecimalId {
    /// Number of decimal digits in each of the worker id and sequence fields.
    pub const FIELD_DIGITS: usize = 5;

    /// Largest worker id: five decimal digits.
    pub const MAX_WORKER_ID: u32 = 99_999;

    /// Largest sequence: five decimal digits.
    pub const MAX_SEQUENCE: u32 = 99_999;

    const FIELD_RADIX: u128 = 100_000;

    /// Extracts the timestamp, in seconds since the epoch.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Extracts the worker id.
    #[must_use]
    pub const fn worker_id(&self) -> u32 {
        self.worker_id
    }

    /// Extracts the sequence.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns the numeric form of the ID.
    ///
    /// A `u128` always fits: the timestamp is at most 20 digits wide.
    #[must_use]
    pub const fn to_u128(&self) -> u128 {
        (self.timestamp as u128 * Self::FIELD_RADIX + self.worker_id as u128) * Self::FIELD_RADIX
            + self.sequence as u128
    }

    /// Splits a numeric ID back into its fields.
    ///
    /// # Errors
    ///
    /// Returns [`ParseIdError::Overflow`] if the timestamp portion does not fit
    /// a `u64`.
    pub fn from_u128(raw: u128) -> Result<Self, ParseIdError> {
        #[allow(clippy::cast_possible_truncation)]
        let sequence = (raw % Self::FIELD_RADIX) as u32;
        let rest = raw / Self::FIELD_RADIX;
        #[allow(clippy::cast_possible_truncation)]
        let worker_id = (rest % Self::FIELD_RADIX) as u32;
        let timestamp =
            u64::try_from(rest / Self::FIELD_RADIX).map_err(|_| ParseIdError::Overflow)?;
        Ok(Self {
            timestamp,
            worker_id,
            sequence,
        })
    }
}

impl TrilliumId for DecimalId {
    const TICK: Duration = Duration::from_secs(1);

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn worker_id(&self) -> u64 {
        u64::from(self.worker_id)
    }

    fn sequence(&self) -> u64 {
        u64::from(self.sequence)
    }

    fn max_timestamp() -> u64 {
        u64::MAX
    }

    fn max_worker_id() -> u64 {
        u64::from(Self::MAX_WORKER_ID)
    }

    fn max_sequence() -> u64 {
        u64::from(Self::MAX_SEQUENCE)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_components(timestamp: u64, worker_id: u64, sequence: u64) -> Self {
        debug_assert!(worker_id <= Self::max_worker_id(), "worker_id overflow");
        debug_assert!(sequence <= Self::max_sequence(), "sequence overflow");
        // Truncate to the field width, the way packed layouts mask.
        Self {
            timestamp,
            worker_id: (worker_id % (Self::max_worker_id() + 1)) as u32,
            sequence: (sequence % (Self::max_sequence() + 1)) as u32,
        }
    }

    fn is_valid(&self) -> bool {
        self.worker_id <= Self::MAX_WORKER_ID && self.sequence <= Self::MAX_SEQUENCE
    }
}

impl fmt::Display for DecimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:05}{:05}",
            self.timestamp, self.worker_id, self.sequence
        )
    }
}

impl FromStr for DecimalId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const FIXED: usize = 2 * DecimalId::FIELD_DIGITS;

        if s.is_empty() {
            return Err(ParseIdError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseIdError::InvalidDigit);
        }
        if s.len() <= FIXED {
            return Err(ParseIdError::TooShort {
                len: s.len(),
                min: FIXED,
            });
        }

        // All-ascii input, so byte offsets are char boundaries.
        let (timestamp, fields) = s.split_at(s.len() - FIXED);
        let (worker_id, sequence) = fields.split_at(Self::FIELD_DIGITS);
        Ok(Self {
            timestamp: timestamp.parse().map_err(|_| ParseIdError::Overflow)?,
            worker_id: worker_id.parse().map_err(|_| ParseIdError::InvalidDigit)?,
            sequence: sequence.parse().map_err(|_| ParseIdError::InvalidDigit)?,
        })
    }
}

impl From<DecimalId> for u128 {
    fn from(id: DecimalId) -> Self {
        id.to_u128()
    }
}

impl TryFrom<DecimalId> for u64 {
    type Error = TryFromIntError;

    /// Fails once the timestamp grows past what a 19/20-digit `u64` can hold.
    fn try_from(id: DecimalId) -> Result<Self, Self::Error> {
        Self::try_from(id.to_u128())
    }
}
