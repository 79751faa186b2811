//! Combinations and trustworthiness of one satellite in one record
use crate::{
    observation::{Record, WavelengthFactor},
    prelude::SV,
    tec::{F1_GHZ, F2_GHZ, SPEED_OF_LIGHT_M_NS, TECU_PER_NS},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [BadnessPolicy] scores how suspect the observations of one satellite
/// are, in one record. The higher, the less trustworthy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BadnessPolicy {
    /// Score of unusable records: satellite missing,
    /// missing carrier phase or missing code on either frequency
    pub invalid: u32,
    /// Scores at or above this value are unusable
    pub invalid_threshold: u32,
    /// Penalty while the antenna is moving
    pub in_motion: u32,
    /// Penalty when P2 is not available
    pub missing_p2: u32,
    /// Penalty per observation under anti spoofing
    pub anti_spoofing: u32,
    /// Penalty per observation with half wavelength factor
    pub half_wavelength: u32,
    /// Observations weaker than this strength class are penalized
    /// by the difference
    pub strength_threshold: u8,
}

impl Default for BadnessPolicy {
    fn default() -> Self {
        Self {
            invalid: 1000,
            invalid_threshold: 100,
            in_motion: 4,
            missing_p2: 1,
            anti_spoofing: 1,
            half_wavelength: 1,
            strength_threshold: 4,
        }
    }
}

impl BadnessPolicy {
    /// True if given score makes the record unusable
    pub fn is_invalid(&self, badness: u32) -> bool {
        badness >= self.invalid_threshold
    }
}

impl Record {
    /// Phase TEC [TECU]: smooth, but biased by an unknown
    /// ambiguity that changes at every cycle slip.
    /// Requires L1 and L2.
    pub fn ptec(&self, sv: &SV) -> Option<f64> {
        let l1 = self.value(sv, "L1")? / F1_GHZ;
        let l2 = self.value(sv, "L2")? / F2_GHZ;
        Some((l1 - l2) * TECU_PER_NS)
    }

    /// Code TEC [TECU]: absolute, but noisy.
    /// Prefers P2 - P1, then C2 - C1, then P2 - C1.
    pub fn ctec(&self, sv: &SV) -> Option<f64> {
        let value = |code: &str| self.value(sv, code);
        let delta = match (value("P1"), value("P2"), value("C1"), value("C2")) {
            (Some(p1), Some(p2), _, _) => p2 - p1,
            (_, _, Some(c1), Some(c2)) => c2 - c1,
            (_, Some(p2), Some(c1), _) => p2 - c1,
            _ => return None,
        };
        Some(delta * TECU_PER_NS / SPEED_OF_LIGHT_M_NS)
    }

    /// Badness score of given satellite in this record
    pub fn badness(&self, sv: &SV, policy: &BadnessPolicy) -> u32 {
        let signals = match self.signals(sv) {
            Some(signals) => signals,
            None => return policy.invalid,
        };

        let has = |code: &str| signals.keys().any(|obs| obs.code() == code);

        if !has("L1") || !has("L2") {
            return policy.invalid;
        }
        if !has("C1") && !has("P1") {
            return policy.invalid;
        }
        if !has("C2") && !has("P2") {
            return policy.invalid;
        }

        let mut badness = 0;
        if self.in_motion {
            badness += policy.in_motion;
        }
        if !has("P2") {
            badness += policy.missing_p2;
        }

        for value in signals.values() {
            if value.anti_spoofing {
                badness += policy.anti_spoofing;
            }
            if value.wave_factor == WavelengthFactor::HalfCycle {
                badness += policy.half_wavelength;
            }
            if value.strength > 0 && value.strength < policy.strength_threshold {
                badness += (policy.strength_threshold - value.strength) as u32;
            }
        }
        badness
    }
}
