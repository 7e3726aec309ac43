//! Generator configuration.
//!
//! A [`Config`] names the epoch and where the worker id comes from. It can be
//! built in code, deserialized with `serde` (`serde` feature), or read from
//! the environment (`env` feature):
//!
//! - `TRILLIUM_SINCE`: epoch as Unix seconds, `0` for [`DEFAULT_EPOCH`]
//! - `TRILLIUM_WORKER_ID`: an integer, `ip` for [`PrivateIpv4`], or `random`
//!   for [`RandomWorkerId`]
//!
//! Environment lookups go through `dotenvy`, so a `.env` file in the working
//! directory is honored.
//!
//! [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH

use core::{fmt, str::FromStr, time::Duration};

use crate::{
    Error, PrivateIpv4, RandomWorkerId, Result, WorkerIdProvider, epoch_from_unix_secs,
};

/// Environment variable holding the epoch in Unix seconds.
pub const SINCE_ENV: &str = "TRILLIUM_SINCE";

/// Environment variable selecting the worker id source.
pub const WORKER_ID_ENV: &str = "TRILLIUM_WORKER_ID";

/// Where a generator's worker id comes from.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkerIdSource {
    /// A worker id assigned by the operator.
    Fixed(u64),
    /// The low 16 bits of the host's private IPv4 address, falling back to a
    /// random draw when the host has none.
    #[default]
    PrivateIpv4,
    /// A random draw within the layout's range.
    Random,
}

impl WorkerIdProvider for WorkerIdSource {
    fn worker_id(&self, max_worker_id: u64) -> Result<u64> {
        match *self {
            Self::Fixed(id) => id.worker_id(max_worker_id),
            Self::PrivateIpv4 => PrivateIpv4::detect()
                .or_else(RandomWorkerId)
                .worker_id(max_worker_id),
            Self::Random => RandomWorkerId.worker_id(max_worker_id),
        }
    }
}

impl FromStr for WorkerIdSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "ip" | "private_ipv4" => Ok(Self::PrivateIpv4),
            "random" => Ok(Self::Random),
            other => other.parse().map(Self::Fixed).map_err(|_| Error::Config {
                key: WORKER_ID_ENV,
                reason: format!("expected an integer, `ip`, or `random`, got `{other}`"),
            }),
        }
    }
}

impl fmt::Display for WorkerIdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(id) => write!(f, "{id}"),
            Self::PrivateIpv4 => f.write_str("ip"),
            Self::Random => f.write_str("random"),
        }
    }
}

/// Settings a [`Generator`] is built from.
///
/// The default uses [`DEFAULT_EPOCH`] and derives the worker id from the
/// host's private IPv4 address.
///
/// [`Generator`]: crate::Generator
/// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Epoch as Unix seconds; `0` selects the default epoch. All instances
    /// sharing an ID space must use the same value, forever.
    pub since: u64,
    /// Where the worker id comes from.
    pub worker_id: WorkerIdSource,
}

impl Config {
    /// The epoch as a duration since the Unix epoch.
    #[must_use]
    pub const fn epoch(&self) -> Duration {
        epoch_from_unix_secs(self.since)
    }

    /// Reads the configuration from the environment (and `.env`).
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but cannot be parsed.
    #[cfg_attr(docsrs, doc(cfg(feature = "env")))]
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(read_env)
    }

    #[cfg(feature = "env")]
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Result<Option<String>>,
    {
        let mut config = Self::default();
        if let Some(since) = lookup(SINCE_ENV)? {
            config.since = since.trim().parse().map_err(|e| Error::Config {
                key: SINCE_ENV,
                reason: format!("{e}"),
            })?;
        }
        if let Some(worker_id) = lookup(WORKER_ID_ENV)? {
            config.worker_id = worker_id.parse()?;
        }
        Ok(config)
    }
}

#[cfg(feature = "env")]
fn read_env(key: &'static str) -> Result<Option<String>> {
    match dotenvy::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
        Err(e) => Err(Error::Config {
            key,
            reason: e.to_string(),
        }),
    }
}
