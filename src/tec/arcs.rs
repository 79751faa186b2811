//! Phase connected arcs
use std::collections::{BTreeMap, BTreeSet};

use crate::{observation::Record, prelude::SV, tec::TecOptions};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of badness classes accounted for in the histogram
pub(crate) const HISTOGRAM_CLASSES: usize = 5;

/// [PhaseArc] is a half open range of record indices, during which
/// the carrier phase of one satellite is considered continuous.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseArc {
    /// First record index
    pub start: usize,
    /// Index past the last record
    pub end: usize,
    /// Number of records per badness score (0 to 4)
    pub histogram: [usize; HISTOGRAM_CLASSES],
}

impl PhaseArc {
    /// Number of records in this arc
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if this arc holds no record
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Number of records with badness 0 or 1
    pub fn good_records(&self) -> usize {
        self.histogram[0] + self.histogram[1]
    }

    /// True if given record index belongs to this arc
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// Arc under construction: open while `end` is unknown
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Candidate {
    start: usize,
    end: Option<usize>,
}

impl Candidate {
    fn open(start: usize) -> Self {
        Self { start, end: None }
    }
    fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// [ArcTracker] follows phase continuity while records are decoded,
/// and produces the final [PhaseArc]s once decoding is complete.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ArcTracker {
    candidates: BTreeMap<SV, Vec<Candidate>>,
    /// Every satellite observed so far
    seen: BTreeSet<SV>,
}

impl ArcTracker {
    /// Closes the open arc of this satellite (if any) at `index`,
    /// and opens a new one from there.
    pub fn break_phase(&mut self, sv: SV, index: usize) {
        let arcs = self.candidates.entry(sv).or_default();
        if let Some(last) = arcs.last_mut() {
            if last.is_open() {
                last.end = Some(index);
            }
        }
        log::debug!("{}: phase break at #{}", sv, index);
        arcs.push(Candidate::open(index));
    }

    /// Checks phase continuity, at the last record of `records`.
    /// Must be called once per new record, after all its observations
    /// were collected.
    pub fn check_break(&mut self, records: &[Record], options: &TecOptions) {
        let policy = &options.badness;
        let len = records.len();
        let last = match records.last() {
            Some(last) => last,
            None => return,
        };
        self.seen.extend(last.satellites().copied());

        if len == 1 {
            for sv in last.satellites() {
                if !policy.is_invalid(last.badness(sv, policy))
                    && !self.candidates.contains_key(sv)
                {
                    self.candidates.insert(*sv, vec![Candidate::open(0)]);
                }
            }
            return;
        }

        if last.power_failure {
            let seen: Vec<SV> = self.seen.iter().copied().collect();
            for sv in seen {
                self.break_phase(sv, len - 1);
            }
            return;
        }

        let satellites: BTreeSet<SV> = last
            .satellites()
            .copied()
            .chain(self.candidates.keys().copied())
            .collect();

        let previous = &records[len - 2];

        for sv in satellites {
            let good = !policy.is_invalid(last.badness(&sv, policy));
            let arcs = self.candidates.entry(sv).or_default();

            let open = arcs.last().map(|arc| arc.is_open()).unwrap_or(false);
            if good && !open {
                arcs.push(Candidate::open(len - 1));
                continue;
            }
            if !open {
                continue;
            }

            let arc = match arcs.last_mut() {
                Some(arc) => arc,
                None => continue,
            };

            if !good {
                log::debug!("{}: missing observations at #{}", sv, len - 1);
                arc.end = Some(len - 1);
                continue;
            }

            let slip = if previous.contains(&sv) {
                match (last.ptec(&sv), previous.ptec(&sv)) {
                    (Some(ptec), Some(prev)) => (ptec - prev).abs() > options.slip_threshold,
                    _ => false,
                }
            } else {
                // opened at a power failure this satellite was missing from
                arc.start = len - 1;
                false
            };

            if slip {
                self.break_phase(sv, len - 1);
            }
        }
        self.candidates.retain(|_, arcs| !arcs.is_empty());
    }

    /// Validates the candidate arcs against the complete log of
    /// `len` records: drops disordered arcs, splits arcs at unusable
    /// records, and drops arcs with too few good records.
    pub fn sanitize(&self, records: &[Record], options: &TecOptions) -> BTreeMap<SV, Vec<PhaseArc>> {
        let policy = &options.badness;
        let len = records.len();
        let mut sanitized = BTreeMap::new();

        for (sv, candidates) in self.candidates.iter() {
            let mut candidates = candidates.clone();
            if let Some(last) = candidates.last_mut() {
                if last.is_open() {
                    last.end = Some(len);
                }
            }

            // strict ordering, within the log
            let mut cursor = 0;
            let mut ranges = Vec::<(usize, usize)>::with_capacity(candidates.len());
            for candidate in candidates.iter() {
                if let Some(end) = candidate.end {
                    if cursor <= candidate.start && candidate.start < end && end <= len {
                        ranges.push((candidate.start, end));
                        cursor = end;
                    }
                }
            }

            let mut arcs = Vec::<PhaseArc>::new();
            let mut k = 0;
            while k < ranges.len() {
                let (start, end) = ranges[k];
                let mut histogram = [0; HISTOGRAM_CLASSES];
                let mut arc_end = end;
                let mut good = true;

                for (index, record) in records.iter().enumerate().take(end).skip(start) {
                    let badness = record.badness(sv, policy);
                    let invalid = policy.is_invalid(badness);
                    if invalid && good {
                        good = false;
                        arc_end = index;
                    } else if !invalid && !good {
                        // remainder is processed next
                        ranges.insert(k + 1, (index, end));
                        break;
                    }
                    if good && (badness as usize) < HISTOGRAM_CLASSES {
                        histogram[badness as usize] += 1;
                    }
                }

                if histogram[0] + histogram[1] >= options.min_good_records {
                    arcs.push(PhaseArc {
                        start,
                        end: arc_end,
                        histogram,
                    });
                }
                k += 1;
            }

            if !arcs.is_empty() {
                sanitized.insert(*sv, arcs);
            }
        }
        sanitized
    }
}
