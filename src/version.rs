//! `RINEX` revision description
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Latest `RINEX` 2 revision we fully understand
pub const SUPPORTED_VERSION: Version = Version { major: 2, minor: 11 };

/// Version is used to describe RINEX standards revisions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Version {
    /// Version major number
    pub major: u8,
    /// Version minor number
    pub minor: u8,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error("failed to parse version \"{0}\"")]
    Parsing(String),
    #[error("non supported major version {0}")]
    NotSupported(u8),
}

impl Default for Version {
    fn default() -> Self {
        SUPPORTED_VERSION
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

impl Version {
    /// Builds a new [Version]
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// True if this revision is newer than the one we fully understand.
    /// Decoding still proceeds (fields we do not know are warned).
    pub fn is_newer_than_supported(&self) -> bool {
        self.major == SUPPORTED_VERSION.major && self.minor > SUPPORTED_VERSION.minor
    }

    /// Checks this revision is a RINEX 2 revision
    pub fn check_supported(&self) -> Result<(), Error> {
        if self.major == SUPPORTED_VERSION.major {
            Ok(())
        } else {
            Err(Error::NotSupported(self.major))
        }
    }
}

impl std::str::FromStr for Version {
    type Err = Error;
    /// Parses "2", "2.1" or "2.11" like descriptors.
    /// Minor digits are taken as written: "2.1" is 2.10.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || Error::Parsing(s.to_string());
        match s.split_once('.') {
            None => {
                let major = s.parse::<u8>().map_err(|_| err())?;
                Ok(Self::new(major, 0))
            },
            Some((major, minor)) => {
                let major = major.parse::<u8>().map_err(|_| err())?;
                let minor = match minor.len() {
                    0 => 0,
                    1 => minor.parse::<u8>().map_err(|_| err())? * 10,
                    2 => minor.parse::<u8>().map_err(|_| err())?,
                    _ => return Err(err()),
                };
                Ok(Self::new(major, minor))
            },
        }
    }
}
