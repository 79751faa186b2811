//! Lost of Lock Indication (LLI) for phase tracking
use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Default, Copy, Clone)]
    #[derive(PartialEq, Eq, PartialOrd)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct LliFlags: u8 {
        /// Lock lost between previous observation and current observation,
        /// cycle slip is possible
        const LOCK_LOSS = 0x01;
        /// Wavelength factor opposite to the one currently declared
        const HALF_CYCLE_SLIP = 0x02;
        /// Observing under anti spoofing,
        /// might suffer from decreased SNR - decreased signal quality
        const UNDER_ANTI_SPOOFING = 0x04;
    }
}

impl LliFlags {
    /// Interprets a single LLI digit, blank being "no flag".
    /// Returns None on anything else.
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            ' ' => Some(Self::empty()),
            c => c.to_digit(10).map(|d| Self::from_bits_truncate(d as u8)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn lli_digits() {
        let lli = LliFlags::from_digit('5').unwrap();
        assert!(lli.contains(LliFlags::LOCK_LOSS));
        assert!(!lli.contains(LliFlags::HALF_CYCLE_SLIP));
        assert!(lli.contains(LliFlags::UNDER_ANTI_SPOOFING));
        assert_eq!(LliFlags::from_digit(' '), Some(LliFlags::empty()));
        assert_eq!(
            LliFlags::from_digit('3'),
            Some(LliFlags::LOCK_LOSS | LliFlags::HALF_CYCLE_SLIP)
        );
        assert_eq!(LliFlags::from_digit('x'), None);
    }
}
