use super::builtin_table;
use crate::prelude::*;
use std::str::FromStr;

pub fn sv(desc: &str) -> SV {
    SV::from_str(desc).unwrap()
}

/*
 * Verifies the log declares (only) the following observables
 */
pub fn check_observables(log: &ObservationLog, observables: &[&str]) {
    let expected = observables
        .iter()
        .map(|desc| Observable::from_str(desc).unwrap())
        .collect::<Vec<_>>();

    let declared = log
        .header()
        .observables_at(0)
        .unwrap_or_else(|| panic!("no observables declared"));

    assert_eq!(declared, expected.as_slice(), "bad observables");
}

/*
 * Verifies both logs carry the same records: same epochs,
 * same flags, same values and same annotations
 */
pub fn check_same_records(dut: &ObservationLog, model: &ObservationLog) {
    assert_eq!(dut.len(), model.len(), "record count mismatch");
    let table = builtin_table();
    for (index, (dut, model)) in dut.records().iter().zip(model.records()).enumerate() {
        assert!(
            dut.epoch.try_eq(&model.epoch, &table).unwrap(),
            "epoch mismatch @{}: {} {}",
            index,
            dut.epoch,
            model.epoch
        );
        assert_eq!(dut.epoch.system(), model.epoch.system(), "time system mismatch @{}", index);
        assert_eq!(dut.power_failure, model.power_failure, "flag mismatch @{}", index);
        assert_eq!(dut.in_motion, model.in_motion, "flag mismatch @{}", index);
        assert_eq!(dut.clock_offset, model.clock_offset, "clock mismatch @{}", index);
        for (sv, signals) in model.observations.iter() {
            let found = dut
                .signals(sv)
                .unwrap_or_else(|| panic!("{} missing @{}", sv, index));
            for (observable, value) in signals {
                assert_eq!(
                    found.get(observable),
                    Some(value),
                    "{} {} mismatch @{}",
                    sv,
                    observable,
                    index
                );
            }
            assert_eq!(found.len(), signals.len(), "{} extra signals @{}", sv, index);
        }
        assert_eq!(
            dut.observations.len(),
            model.observations.len(),
            "satellites mismatch @{}",
            index
        );
    }
}
