//! WAVELENGTH FACT L1/2 support
use std::collections::BTreeMap;

use crate::prelude::{Constellation, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of GPS vehicles covered by a global declaration
const GPS_VEHICLES: u8 = 32;

/// [WavelengthTable] stores the (L1, L2) wavelength factors
/// currently declared for each GPS satellite:
/// 1 full cycle ambiguities, 2 half cycle ambiguities, 0 does not apply.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WavelengthTable {
    factors: BTreeMap<SV, (u8, u8)>,
}

impl Default for WavelengthTable {
    /// Full cycle ambiguities for G01 to G32
    fn default() -> Self {
        let mut s = Self {
            factors: BTreeMap::new(),
        };
        s.set_all(1, 1);
        s
    }
}

impl WavelengthTable {
    /// Global declaration: applies to G01 to G32,
    /// and drops former satellite specific declarations.
    pub fn set_all(&mut self, l1: u8, l2: u8) {
        self.factors.clear();
        for prn in 1..=GPS_VEHICLES {
            self.factors
                .insert(SV::new(Constellation::GPS, prn), (l1, l2));
        }
    }

    /// Satellite specific declaration
    pub fn set(&mut self, sv: SV, l1: u8, l2: u8) {
        self.factors.insert(sv, (l1, l2));
    }

    /// Returns wavelength factor of given satellite on given frequency
    /// (1 or 2), defaulting to full cycle
    pub fn ambiguity(&self, sv: &SV, frequency: u8) -> u8 {
        match (self.factors.get(sv), frequency) {
            (Some((l1, _)), 1) => *l1,
            (Some((_, l2)), 2) => *l2,
            _ => 1,
        }
    }

    /// Iterates declared (satellite, (L1, L2)) factors
    pub fn iter(&self) -> impl Iterator<Item = (&SV, &(u8, u8))> + '_ {
        self.factors.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    #[test]
    fn wavelength_table() {
        let g01 = SV::from_str("G01").unwrap();
        let g05 = SV::from_str("G05").unwrap();
        let mut table = WavelengthTable::default();
        assert_eq!(table.ambiguity(&g01, 1), 1);
        assert_eq!(table.ambiguity(&g01, 2), 1);
        assert_eq!(table.iter().count(), 32);

        table.set(g05, 1, 2);
        assert_eq!(table.ambiguity(&g05, 2), 2);
        assert_eq!(table.ambiguity(&g01, 2), 1);

        table.set_all(2, 2);
        assert_eq!(table.ambiguity(&g05, 2), 2);
        assert_eq!(table.ambiguity(&g01, 1), 2);

        let r01 = SV::from_str("R01").unwrap();
        assert_eq!(table.ambiguity(&r01, 1), 1);
    }
}
