//! Header consistency, once all records are known.
//! Declared values are compared to the data, missing values are
//! deduced from it.
use std::{cmp::Ordering, collections::BTreeMap};

use hifitime::{Epoch, Unit};

use crate::{
    diagnostics::{Diagnostics, Warning},
    error::Error,
    gnss_time::{TimePoint, TimeSystem},
    header::{Field, HeaderEntry, HeaderValue},
    leap::LeapSecondTable,
    observation_log::ObservationLog,
    prelude::SV,
};

/// GPS time is steered 19s behind TAI
const GPST_TAI_OFFSET_SECONDS: f64 = 19.0;

/// Intervals closer than this are identical [s]
const INTERVAL_TOLERANCE: f64 = 1.0E-6;

/// `now` is the current instant, the system clock is read when missing.
pub(crate) fn check(
    log: &mut ObservationLog,
    table: &LeapSecondTable,
    now: Option<TimePoint>,
    diagnostics: &mut dyn Diagnostics,
) -> Result<(), Error> {
    if log.records.is_empty() {
        diagnostics.warn(Warning::EmptyLog);
        return Ok(());
    }
    boundaries(log, table, diagnostics)?;
    leap_seconds(log, table, now, diagnostics)?;
    interval(log, table, diagnostics)?;
    satellites(log, diagnostics);
    observation_counts(log, diagnostics);
    Ok(())
}

/// TIME OF FIRST OBS and TIME OF LAST OBS
fn boundaries(
    log: &mut ObservationLog,
    table: &LeapSecondTable,
    diagnostics: &mut dyn Diagnostics,
) -> Result<(), Error> {
    let (first, last) = match (log.records.first(), log.records.last()) {
        (Some(first), Some(last)) => (first.epoch, last.epoch),
        _ => return Ok(()),
    };

    match log.header.first_observation().copied() {
        Some(header) => {
            if !header.try_eq(&first, table)? {
                diagnostics.warn(Warning::FirstObservationMismatch {
                    header,
                    data: first,
                });
            }
        },
        None => log.header.set_single(
            Field::FirstObservation,
            HeaderEntry::new(HeaderValue::Time(first), 0, 0),
        ),
    }

    match log.header.last_observation().copied() {
        Some(header) => {
            if !header.try_eq(&last, table)? {
                diagnostics.warn(Warning::LastObservationMismatch {
                    header,
                    data: last,
                });
            }
        },
        None => log.header.set_single(
            Field::LastObservation,
            HeaderEntry::new(HeaderValue::Time(last), 0, 0),
        ),
    }
    Ok(())
}

/// GPS - UTC [s] at given UTC instant
fn gps_utc(table: &LeapSecondTable, utc: Epoch) -> i64 {
    let tai_utc = table.offset_at_utc(utc).to_seconds();
    (tai_utc - GPST_TAI_OFFSET_SECONDS).round() as i64
}

/// LEAP SECONDS
fn leap_seconds(
    log: &mut ObservationLog,
    table: &LeapSecondTable,
    now: Option<TimePoint>,
    diagnostics: &mut dyn Diagnostics,
) -> Result<(), Error> {
    let utc = log
        .records
        .iter()
        .map(|record| -> Result<Epoch, Error> {
            Ok(record.epoch.to_system(TimeSystem::UTC, table)?.wall())
        })
        .collect::<Result<Vec<Epoch>, Error>>()?;

    let (first, last) = match (utc.first(), utc.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Ok(()),
    };

    let declared: Vec<(usize, i64)> = log
        .header
        .entries(Field::LeapSeconds)
        .iter()
        .filter_map(|entry| Some((entry.record, entry.value.as_integer()?)))
        .collect();

    if declared.is_empty() {
        log.header.set_scoped(
            Field::LeapSeconds,
            HeaderEntry::new(HeaderValue::Integer(gps_utc(table, first)), 0, 0),
        );
        for (leap, _) in table.entries_between(first, last) {
            if let Some(index) = utc.iter().position(|t| *t >= leap) {
                log::debug!("leap second at record #{}", index);
                log.header.set_scoped(
                    Field::LeapSeconds,
                    HeaderEntry::new(HeaderValue::Integer(gps_utc(table, utc[index])), index, 0),
                );
            }
        }
        return Ok(());
    }

    let mismatches: Vec<(i64, i64)> = declared
        .into_iter()
        .filter_map(|(record, header)| {
            let expected = gps_utc(table, utc[record.min(utc.len() - 1)]);
            if expected != header {
                Some((header, expected))
            } else {
                None
            }
        })
        .collect();

    if mismatches.is_empty() {
        return Ok(());
    }

    let now = match now {
        Some(now) => now,
        None => TimePoint::now()?,
    };
    if let Some(updated) = table.last_update() {
        if updated.try_cmp(&now, table)? == Ordering::Greater {
            diagnostics.warn(Warning::LeapTableAhead { updated, now });
        }
    }

    let stale = table.is_stale(&now)?;
    for (header, expected) in mismatches {
        diagnostics.warn(Warning::LeapSecondsMismatch {
            header,
            table: expected,
            stale,
        });
    }
    Ok(())
}

/// INTERVAL
fn interval(
    log: &mut ObservationLog,
    table: &LeapSecondTable,
    diagnostics: &mut dyn Diagnostics,
) -> Result<(), Error> {
    let mut observed: Option<f64> = None;
    for pair in log.records.windows(2) {
        let dt = pair[1].epoch.try_sub(&pair[0].epoch, table)?.to_unit(Unit::Second);
        observed = Some(observed.map_or(dt, |min| min.min(dt)));
    }

    let observed = match observed {
        Some(observed) => observed,
        None => return Ok(()),
    };

    match log.header.interval() {
        Some(header) => {
            if (header - observed).abs() > INTERVAL_TOLERANCE {
                diagnostics.warn(Warning::IntervalMismatch {
                    header,
                    data: observed,
                });
            }
        },
        None => log.header.set_scoped(
            Field::Interval,
            HeaderEntry::new(HeaderValue::Float(observed), 0, 0),
        ),
    }
    Ok(())
}

/// # OF SATELLITES
fn satellites(log: &mut ObservationLog, diagnostics: &mut dyn Diagnostics) {
    let observed = log.counts.len();
    match log.header.satellites() {
        Some(header) => {
            if header != observed {
                diagnostics.warn(Warning::SatelliteCountMismatch {
                    header,
                    data: observed,
                });
            }
        },
        None => log.header.set_single(
            Field::Satellites,
            HeaderEntry::new(HeaderValue::Integer(observed as i64), 0, 0),
        ),
    }
}

/// PRN / # OF OBS, against the observation codes of the file header
fn observation_counts(log: &mut ObservationLog, diagnostics: &mut dyn Diagnostics) {
    let codes = match log.header.first(Field::Observables).and_then(|v| v.as_observables()) {
        Some(codes) => codes.to_vec(),
        None => return,
    };

    let declared = match log.header.observation_counts() {
        Some(declared) => declared.clone(),
        None => {
            let counts: BTreeMap<SV, Vec<usize>> = log
                .counts
                .iter()
                .map(|(sv, counts)| {
                    let counts = codes
                        .iter()
                        .map(|code| counts.get(code).copied().unwrap_or(0))
                        .collect();
                    (*sv, counts)
                })
                .collect();
            log.header.set_single(
                Field::ObservationCounts,
                HeaderEntry::new(HeaderValue::ObservationCounts(counts), 0, 0),
            );
            return;
        },
    };

    let not_observed: Vec<SV> = declared
        .keys()
        .filter(|sv| !log.counts.contains_key(sv))
        .copied()
        .collect();
    if !not_observed.is_empty() {
        diagnostics.warn(Warning::SatellitesNotObserved(not_observed));
    }

    let not_listed: Vec<SV> = log
        .counts
        .keys()
        .filter(|sv| !declared.contains_key(sv))
        .copied()
        .collect();
    if !not_listed.is_empty() {
        diagnostics.warn(Warning::SatellitesNotListed(not_listed));
    }

    for (sv, header) in declared.iter() {
        let observed = match log.counts.get(sv) {
            Some(observed) => observed,
            None => continue,
        };
        for (k, code) in codes.iter().enumerate() {
            let header = header.get(k).copied().unwrap_or(0);
            let data = observed.get(code).copied().unwrap_or(0);
            if header != data {
                diagnostics.warn(Warning::ObservationCountMismatch {
                    sv: *sv,
                    observable: code.clone(),
                    header,
                    data,
                });
            }
        }
    }
}
