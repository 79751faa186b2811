use std::collections::BTreeMap;

use crate::{
    gnss_time::TimePoint, observable::Observable, observation::AnnotatedValue, prelude::SV,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Observations of one satellite, by observation code
pub type SignalMap = BTreeMap<Observable, AnnotatedValue>;

/// [Record] is one observation epoch
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    /// Sampling instant, in the time system of the log
    pub epoch: TimePoint,
    /// A power failure occurred since previous epoch
    pub power_failure: bool,
    /// Antenna was moving while observing
    pub in_motion: bool,
    /// Receiver clock offset, in seconds
    pub clock_offset: Option<f64>,
    /// Observations, per satellite and observation code
    pub observations: BTreeMap<SV, SignalMap>,
}

impl Record {
    /// Builds a new [Record] with no observation
    pub fn new(epoch: TimePoint) -> Self {
        Self {
            epoch,
            power_failure: false,
            in_motion: false,
            clock_offset: None,
            observations: BTreeMap::new(),
        }
    }

    /// Copies and sets the power failure flag
    pub fn with_power_failure(&self, power_failure: bool) -> Self {
        let mut s = self.clone();
        s.power_failure = power_failure;
        s
    }

    /// Copies and sets the antenna motion flag
    pub fn with_motion(&self, in_motion: bool) -> Self {
        let mut s = self.clone();
        s.in_motion = in_motion;
        s
    }

    /// Copies and sets the receiver clock offset
    pub fn with_clock_offset(&self, offset: Option<f64>) -> Self {
        let mut s = self.clone();
        s.clock_offset = offset;
        s
    }

    /// Stores a new observation
    pub fn insert(&mut self, sv: SV, observable: Observable, value: AnnotatedValue) {
        self.observations
            .entry(sv)
            .or_default()
            .insert(observable, value);
    }

    /// True if given satellite was observed in this epoch
    pub fn contains(&self, sv: &SV) -> bool {
        self.observations.contains_key(sv)
    }

    /// Observations of given satellite
    pub fn signals(&self, sv: &SV) -> Option<&SignalMap> {
        self.observations.get(sv)
    }

    /// Observation for given satellite and code
    pub fn get(&self, sv: &SV, observable: &Observable) -> Option<&AnnotatedValue> {
        self.observations.get(sv)?.get(observable)
    }

    /// Observed value, for given satellite and code literal ("L1", "C2"..)
    pub fn value(&self, sv: &SV, code: &str) -> Option<f64> {
        self.observations
            .get(sv)?
            .iter()
            .find(|(observable, _)| observable.code() == code)
            .map(|(_, value)| value.value)
    }

    /// Satellites observed in this epoch
    pub fn satellites(&self) -> impl Iterator<Item = &SV> + '_ {
        self.observations.keys()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gnss_time::TimeSystem;
    use std::str::FromStr;
    #[test]
    fn record() {
        let t = TimePoint::new(2021, 1, 1, 0, 0, 0, 0, TimeSystem::GPS).unwrap();
        let mut record = Record::new(t).with_clock_offset(Some(1.0E-3));
        assert_eq!(record.clock_offset, Some(1.0E-3));
        assert!(!record.power_failure);
        assert!(record.with_motion(true).in_motion);

        let g01 = SV::from_str("G01").unwrap();
        let l1 = Observable::from_str("L1").unwrap();
        record.insert(g01, l1.clone(), AnnotatedValue::new(123.456));

        assert!(record.contains(&g01));
        assert_eq!(record.value(&g01, "L1"), Some(123.456));
        assert_eq!(record.value(&g01, "L2"), None);
        assert_eq!(record.get(&g01, &l1).map(|v| v.value), Some(123.456));
        assert_eq!(record.satellites().count(), 1);
    }
}
