/// A [`TrilliumId`] packed into a single `u64`.
///
/// Implemented by every type declared with [`define_packed_id!`].
///
/// [`TrilliumId`]: crate::TrilliumId
pub trait PackedLayout: crate::TrilliumId {
    /// Converts this type into its raw integer representation.
    fn to_raw(&self) -> u64;

    /// Converts a raw integer into this type without validation.
    fn from_raw(raw: u64) -> Self;
}

/// Declares a bit-packed [`TrilliumId`] with custom field widths and tick.
///
/// Fields are packed from **MSB to LSB** as reserved, timestamp, sequence,
/// worker id. The field widths must add up to 64 bits, and the tick must be
/// non-zero; both are checked at compile time.
///
/// ```text
///  Bit Index:  high bits                                              low bits
///              +--------------+---------------+--------------+---------------+
///  Field:      | reserved (R) | timestamp (T) | sequence (S) | worker id (W) |
///              +--------------+---------------+--------------+---------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB -------->|
/// ```
///
/// ## Example
///
/// ```
/// use core::time::Duration;
/// use trillium::{define_packed_id, TrilliumId};
///
/// define_packed_id!(
///     /// One-second ticks with room for 1024 workers.
///     CoarseId,
///     reserved: 1,
///     timestamp: 41,
///     sequence: 12,
///     worker_id: 10,
///     tick: Duration::from_secs(1)
/// );
///
/// let id = CoarseId::from_components(7, 3, 9);
/// assert_eq!(id.timestamp(), 7);
/// assert_eq!(CoarseId::max_worker_id(), 1023);
/// ```
///
/// [`TrilliumId`]: crate::TrilliumId
#[macro_export]
macro_rules! define_packed_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        reserved: $reserved_bits:expr,
        timestamp: $timestamp_bits:expr,
        sequence: $sequence_bits:expr,
        worker_id: $worker_id_bits:expr,
        tick: $tick:expr
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name {
            id: u64,
        }

        const _: () = {
            // Every bit of the backing integer belongs to exactly one field.
            assert!(
                $reserved_bits + $timestamp_bits + $sequence_bits + $worker_id_bits == u64::BITS,
                "Layout must match underlying type width"
            );
            assert!(!$name::TICK.is_zero(), "Tick must be non-zero");
        };

        impl $name {
            pub const RESERVED_BITS: u64 = $reserved_bits;
            pub const TIMESTAMP_BITS: u64 = $timestamp_bits;
            pub const SEQUENCE_BITS: u64 = $sequence_bits;
            pub const WORKER_ID_BITS: u64 = $worker_id_bits;

            pub const WORKER_ID_SHIFT: u64 = 0;
            pub const SEQUENCE_SHIFT: u64 = Self::WORKER_ID_SHIFT + Self::WORKER_ID_BITS;
            pub const TIMESTAMP_SHIFT: u64 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
            pub const RESERVED_SHIFT: u64 = Self::TIMESTAMP_SHIFT + Self::TIMESTAMP_BITS;

            pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;
            pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;
            pub const WORKER_ID_MASK: u64 = (1 << Self::WORKER_ID_BITS) - 1;

            /// Length of one timestamp tick.
            pub const TICK: core::time::Duration = $tick;

            const fn valid_mask() -> u64 {
                (Self::TIMESTAMP_MASK << Self::TIMESTAMP_SHIFT)
                    | (Self::SEQUENCE_MASK << Self::SEQUENCE_SHIFT)
                    | (Self::WORKER_ID_MASK << Self::WORKER_ID_SHIFT)
            }

            #[must_use]
            pub const fn from(timestamp: u64, worker_id: u64, sequence: u64) -> Self {
                let t = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
                let s = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
                let w = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
                Self { id: t | s | w }
            }

            /// Extracts the timestamp from the packed ID.
            #[must_use]
            pub const fn timestamp(&self) -> u64 {
                (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
            }

            /// Extracts the sequence from the packed ID.
            #[must_use]
            pub const fn sequence(&self) -> u64 {
                (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
            }

            /// Extracts the worker id from the packed ID.
            #[must_use]
            pub const fn worker_id(&self) -> u64 {
                (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
            }

            #[must_use]
            pub const fn max_timestamp() -> u64 {
                Self::TIMESTAMP_MASK
            }

            #[must_use]
            pub const fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }

            #[must_use]
            pub const fn max_worker_id() -> u64 {
                Self::WORKER_ID_MASK
            }

            /// Returns `true` if no reserved bit is set.
            #[must_use]
            pub const fn is_valid(&self) -> bool {
                (self.id & !Self::valid_mask()) == 0
            }

            /// Converts this type into its raw integer representation.
            #[must_use]
            pub const fn to_raw(&self) -> u64 {
                self.id
            }

            /// Converts a raw integer into this type.
            #[must_use]
            pub const fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }
        }

        impl $crate::TrilliumId for $name {
            const TICK: core::time::Duration = $tick;

            fn timestamp(&self) -> u64 {
                self.timestamp()
            }

            fn worker_id(&self) -> u64 {
                self.worker_id()
            }

            fn sequence(&self) -> u64 {
                self.sequence()
            }

            fn max_timestamp() -> u64 {
                Self::TIMESTAMP_MASK
            }

            fn max_worker_id() -> u64 {
                Self::WORKER_ID_MASK
            }

            fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }

            fn from_components(timestamp: u64, worker_id: u64, sequence: u64) -> Self {
                debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
                debug_assert!(worker_id <= Self::WORKER_ID_MASK, "worker_id overflow");
                debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
                Self::from(timestamp, worker_id, sequence)
            }

            fn is_valid(&self) -> bool {
                self.is_valid()
            }
        }

        impl $crate::PackedLayout for $name {
            fn to_raw(&self) -> u64 {
                self.id
            }

            fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.id)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("id", &self.id)
                    .field("timestamp", &self.timestamp())
                    .field("sequence", &self.sequence())
                    .field("worker_id", &self.worker_id())
                    .finish()
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::ParseIdError;

            fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
                if s.is_empty() {
                    return Err($crate::ParseIdError::Empty);
                }
                if !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err($crate::ParseIdError::InvalidDigit);
                }
                let raw: u64 = s.parse().map_err(|_| $crate::ParseIdError::Overflow)?;
                let id = Self::from_raw(raw);
                if !id.is_valid() {
                    return Err($crate::ParseIdError::ReservedBitsSet { raw });
                }
                Ok(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.to_raw()
            }
        }
    };
}

define_packed_id!(
    /// The canonical 64-bit trillium layout.
    ///
    /// - 1 bit reserved
    /// - 39 bits timestamp (10 ms ticks, about 174 years of range)
    /// - 8 bits sequence (256 IDs per tick, 25 600 per second)
    /// - 16 bits worker id
    ///
    /// ```text
    ///  Bit Index:  63           63 62            24 23            16 15               0
    ///              +--------------+----------------+----------------+-----------------+
    ///  Field:      | reserved (1) | timestamp (39) | sequence (8)   | worker id (16)  |
    ///              +--------------+----------------+----------------+-----------------+
    ///              |<----------- MSB ------------- 64 bits ------------ LSB --------->|
    /// ```
    PackedId,
    reserved: 1,
    timestamp: 39,
    sequence: 8,
    worker_id: 16,
    tick: core::time::Duration::from_millis(10)
);
