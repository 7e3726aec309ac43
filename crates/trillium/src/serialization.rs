//! `serde` adapters for use with `#[serde(with = "...")]`.
//!
//! - [`as_native`]: a packed ID as its raw `u64`
//! - [`as_string`]: any ID as its canonical decimal string
//!
//! Decimal IDs outgrow `u64` over time and lose precision as JSON numbers in
//! most consumers, so they are best carried with [`as_string`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod as_native {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::{PackedLayout, ParseIdError};

    /// Serialize a packed ID as its raw integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<ID, S>(id: &ID, s: S) -> Result<S::Ok, S::Error>
    where
        ID: PackedLayout,
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize a packed ID from its raw integer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The integer sets reserved bits
    pub fn deserialize<'de, ID, D>(d: D) -> Result<ID, D::Error>
    where
        ID: PackedLayout,
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(d)?;
        let id = ID::from_raw(raw);
        if !id.is_valid() {
            return Err(serde::de::Error::custom(ParseIdError::ReservedBitsSet {
                raw,
            }));
        }
        Ok(id)
    }
}

pub mod as_string {
    use core::{fmt, marker::PhantomData, str::FromStr};

    use super::{Deserializer, Serializer};

    /// Serialize an ID as its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<ID, S>(id: &ID, s: S) -> Result<S::Ok, S::Error>
    where
        ID: fmt::Display,
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize an ID from its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string does not parse as `ID`
    pub fn deserialize<'de, ID, D>(d: D) -> Result<ID, D::Error>
    where
        ID: FromStr,
        ID::Err: fmt::Display,
        D: Deserializer<'de>,
    {
        struct IdVisitor<ID>(PhantomData<ID>);

        impl<ID> serde::de::Visitor<'_> for IdVisitor<ID>
        where
            ID: FromStr,
            ID::Err: fmt::Display,
        {
            type Value = ID;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string of ascii digits")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(serde::de::Error::custom)
            }
        }

        d.deserialize_str(IdVisitor(PhantomData))
    }
}
