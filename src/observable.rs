use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unknown observable \"{0}\"")]
    UnknownObservable(String),
    #[error("malformed observable \"{0}\"")]
    MalformedDescriptor(String),
}

/// RINEX 2 observation code, like "L1", "C1" or "P2".
/// The derived "TEC" code is produced by the calibration engine.
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash, Ord, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Observable {
    /// Carrier phase observation, in cycles
    Phase(String),
    /// Doppler shift observation, in Hz
    Doppler(String),
    /// SSI observation, receiver dependent
    SSI(String),
    /// Pseudo range observation, in meters
    PseudoRange(String),
    /// Calibrated slant TEC, in TECu
    Tec,
}

impl Observable {
    pub fn is_phase_observable(&self) -> bool {
        matches!(self, Self::Phase(_))
    }
    pub fn is_pseudorange_observable(&self) -> bool {
        matches!(self, Self::PseudoRange(_))
    }
    pub fn is_doppler_observable(&self) -> bool {
        matches!(self, Self::Doppler(_))
    }
    pub fn is_ssi_observable(&self) -> bool {
        matches!(self, Self::SSI(_))
    }
    /// Returns the 2 letter code
    pub fn code(&self) -> &str {
        match self {
            Self::Phase(c) | Self::Doppler(c) | Self::SSI(c) | Self::PseudoRange(c) => c,
            Self::Tec => "TEC",
        }
    }
    /// Frequency number (1 for L1, 2 for L2, ...), when it applies
    pub fn frequency(&self) -> Option<u8> {
        match self {
            Self::Tec => None,
            _ => self
                .code()
                .chars()
                .nth(1)
                .and_then(|c| c.to_digit(10))
                .map(|d| d as u8),
        }
    }
}

impl std::fmt::Display for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Observable {
    type Err = Error;
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let content = content.trim();
        if content == "TEC" {
            return Ok(Self::Tec);
        }
        if content.len() != 2 {
            return Err(Error::MalformedDescriptor(content.to_string()));
        }
        if !content[1..].chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::MalformedDescriptor(content.to_string()));
        }
        match &content[..1] {
            "L" => Ok(Self::Phase(content.to_string())),
            "D" => Ok(Self::Doppler(content.to_string())),
            "S" => Ok(Self::SSI(content.to_string())),
            "C" | "P" => Ok(Self::PseudoRange(content.to_string())),
            _ => Err(Error::UnknownObservable(content.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    #[test]
    fn observable() {
        let l1 = Observable::from_str("L1").unwrap();
        assert!(l1.is_phase_observable());
        assert_eq!(l1.frequency(), Some(1));
        assert_eq!(l1.to_string(), "L1");

        let p2 = Observable::from_str(" P2").unwrap();
        assert!(p2.is_pseudorange_observable());
        assert_eq!(p2.frequency(), Some(2));

        assert!(Observable::from_str("S1").unwrap().is_ssi_observable());
        assert!(Observable::from_str("D2").unwrap().is_doppler_observable());
        assert_eq!(Observable::from_str("TEC"), Ok(Observable::Tec));
        assert_eq!(Observable::Tec.frequency(), None);

        assert!(Observable::from_str("X1").is_err());
        assert!(Observable::from_str("L1C").is_err());
        assert!(Observable::from_str("LL").is_err());
    }
}
