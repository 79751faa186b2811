use crate::{
    observable::Observable,
    observation::LliFlags,
    prelude::{Constellation, SV},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wavelength factor (ambiguity) of a carrier observation,
/// only defined for GPS L1 and L2
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WavelengthFactor {
    /// Does not apply
    #[default]
    NotApplicable,
    /// Full cycle ambiguities
    FullCycle,
    /// Half cycle ambiguities (squaring receivers)
    HalfCycle,
}

impl WavelengthFactor {
    /// Numerical value: 0, 1 or 2
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::NotApplicable => 0,
            Self::FullCycle => 1,
            Self::HalfCycle => 2,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::FullCycle,
            2 => Self::HalfCycle,
            _ => Self::NotApplicable,
        }
    }

    /// Resolves the wavelength factor of one observation, from its LLI flags
    /// and the ambiguity currently declared for this satellite and frequency.
    /// The half cycle LLI bit selects the opposite factor.
    pub fn resolve(sv: SV, observable: &Observable, lli: LliFlags, ambiguity: u8) -> Self {
        let frequency = observable.frequency().unwrap_or(0);
        if sv.constellation != Constellation::GPS || !(1..=2).contains(&frequency) {
            return Self::NotApplicable;
        }
        if lli.contains(LliFlags::HALF_CYCLE_SLIP) {
            Self::from_u8((ambiguity % 2) + 1)
        } else {
            Self::from_u8(ambiguity)
        }
    }
}

/// [AnnotatedValue] is one observation with its tracking annotations
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnnotatedValue {
    /// Observed value, in physical units
    pub value: f64,
    /// Loss of lock since previous observation
    pub lost_lock: bool,
    /// Wavelength factor
    pub wave_factor: WavelengthFactor,
    /// Observed under anti spoofing
    pub anti_spoofing: bool,
    /// Signal strength class, 1 (minimum) to 9 (maximum), 0 unknown
    pub strength: u8,
}

impl AnnotatedValue {
    /// Builds a plain value, without annotations
    pub fn new(value: f64) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    /// Annotates a value from its LLI flags and signal strength digit
    pub fn annotated(
        value: f64,
        lli: LliFlags,
        wave_factor: WavelengthFactor,
        strength: u8,
    ) -> Self {
        Self {
            value,
            lost_lock: lli.contains(LliFlags::LOCK_LOSS),
            anti_spoofing: lli.contains(LliFlags::UNDER_ANTI_SPOOFING),
            wave_factor,
            strength,
        }
    }

    /// Copies and sets the lost lock flag
    pub fn with_lost_lock(&self, lost_lock: bool) -> Self {
        let mut s = *self;
        s.lost_lock = lost_lock;
        s
    }

    /// Copies and sets the anti spoofing flag
    pub fn with_anti_spoofing(&self, anti_spoofing: bool) -> Self {
        let mut s = *self;
        s.anti_spoofing = anti_spoofing;
        s
    }

    /// Copies and sets the wavelength factor
    pub fn with_wave_factor(&self, wave_factor: WavelengthFactor) -> Self {
        let mut s = *self;
        s.wave_factor = wave_factor;
        s
    }

    /// Copies and sets the signal strength
    pub fn with_strength(&self, strength: u8) -> Self {
        let mut s = *self;
        s.strength = strength;
        s
    }
}
