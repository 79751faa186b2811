//! Slant TEC from dual frequency GPS observations:
//! phase connected arcs tracking and code / phase calibration.
mod arcs;
mod badness;
mod calibration;

pub use arcs::PhaseArc;
pub use badness::BadnessPolicy;

pub(crate) use arcs::ArcTracker;
pub(crate) use calibration::calibrate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// L1 frequency [GHz], converts cycles to ns
pub const F1_GHZ: f64 = 1.57542;

/// L2 frequency [GHz], converts cycles to ns
pub const F2_GHZ: f64 = 1.22760;

/// TEC units per ns of differential delay
pub const TECU_PER_NS: f64 = 2.854;

/// Speed of light [m/ns]
pub const SPEED_OF_LIGHT_M_NS: f64 = 0.299792458;

/// L2 cycles per TECU
pub const L2_CYCLES_PER_TECU: f64 = 2.3254;

/// [TecOptions] tune the arcs tracking and the calibration
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TecOptions {
    /// Phase TEC jump between two consecutive records
    /// that is considered a cycle slip [TECU].
    /// Defaults to 8 L2 cycles, which suits 30s sampling.
    pub slip_threshold: f64,
    /// Minimal number of records with badness 0 or 1 for an arc to be kept
    pub min_good_records: usize,
    /// Share of an arc the calibration bound may leave out
    pub max_excluded_share: f64,
    /// Badness scoring
    pub badness: BadnessPolicy,
}

impl Default for TecOptions {
    fn default() -> Self {
        Self {
            slip_threshold: 8.0 / L2_CYCLES_PER_TECU,
            min_good_records: 16,
            max_excluded_share: 0.2,
            badness: BadnessPolicy::default(),
        }
    }
}

impl TecOptions {
    /// Copies and sets the cycle slip threshold [TECU]
    pub fn with_slip_threshold(&self, threshold: f64) -> Self {
        let mut s = *self;
        s.slip_threshold = threshold;
        s
    }

    /// Copies and sets the minimal number of good records per arc
    pub fn with_min_good_records(&self, min: usize) -> Self {
        let mut s = *self;
        s.min_good_records = min;
        s
    }

    /// Copies and sets the share of an arc calibration may leave out
    pub fn with_max_excluded_share(&self, share: f64) -> Self {
        let mut s = *self;
        s.max_excluded_share = share;
        s
    }

    /// Copies and sets the [BadnessPolicy]
    pub fn with_badness_policy(&self, policy: BadnessPolicy) -> Self {
        let mut s = *self;
        s.badness = policy;
        s
    }
}
