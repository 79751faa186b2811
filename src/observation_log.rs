//! Decoded observation log
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use crate::{
    decoder::Decoder,
    diagnostics::LogDiagnostics,
    error::Error,
    gnss_time::{TimePoint, TimeSystem},
    header::{Field, HeaderStore},
    leap::LeapSecondTable,
    observable::Observable,
    observation::{AnnotatedValue, Record, SignalMap},
    prelude::SV,
    tec::{calibrate, ArcTracker, PhaseArc, TecOptions},
};

/// [ObservationLog] is the result of decoding one observation file:
/// the time ordered [Record]s, the header fields, and the phase
/// connected arcs found in the data.
#[derive(Debug, Clone)]
pub struct ObservationLog {
    pub(crate) header: HeaderStore,
    pub(crate) records: Vec<Record>,
    /// Number of observations, per satellite (as soon as listed) and code
    pub(crate) counts: BTreeMap<SV, BTreeMap<Observable, usize>>,
    pub(crate) time_system: TimeSystem,
    pub(crate) header_blocks: usize,
    pub(crate) filename: Option<String>,
    pub(crate) options: TecOptions,
    tracker: ArcTracker,
    arcs: BTreeMap<SV, Vec<PhaseArc>>,
}

impl ObservationLog {
    pub(crate) fn new(header: HeaderStore, time_system: TimeSystem, options: TecOptions) -> Self {
        Self {
            header,
            time_system,
            options,
            records: Vec::new(),
            counts: BTreeMap::new(),
            header_blocks: 1,
            filename: None,
            tracker: ArcTracker::default(),
            arcs: BTreeMap::new(),
        }
    }

    /// Decodes a local RINEX or Compact RINEX file, with default options.
    /// Warnings are forwarded to the `log` facade.
    /// Files ending with ".gz" are supported with the `flate2` feature.
    pub fn from_file<P: AsRef<Path>>(path: P, table: &LeapSecondTable) -> Result<Self, Error> {
        Decoder::new(table).decode_file(path, &mut LogDiagnostics)
    }

    /// Appends a new record, and tracks phase continuity
    pub(crate) fn push_record(&mut self, record: Record) {
        let index = self.records.len();
        let lost_lock: Vec<SV> = record
            .observations
            .iter()
            .filter(|(_, signals)| signals.values().any(|value| value.lost_lock))
            .map(|(sv, _)| *sv)
            .collect();

        self.records.push(record);

        for sv in lost_lock {
            self.tracker.break_phase(sv, index);
        }
        self.tracker.check_break(&self.records, &self.options);
    }

    /// Cycle slip reported ahead of the next record
    pub(crate) fn break_phase(&mut self, sv: SV) {
        self.tracker.break_phase(sv, self.records.len());
    }

    /// Validates phase connected arcs and calibrates TEC.
    /// Runs once, after decoding.
    pub(crate) fn calibrate(&mut self) {
        self.arcs = self.tracker.sanitize(&self.records, &self.options);
        calibrate(&mut self.records, &self.arcs, &self.options);
    }

    /// Header fields
    pub fn header(&self) -> &HeaderStore {
        &self.header
    }

    /// Records, in chronological order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Record at given index
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Time system all epochs are expressed in
    pub fn time_system(&self) -> TimeSystem {
        self.time_system
    }

    /// Number of discontiguous header blocks: the file header,
    /// plus each header block found along the records.
    pub fn header_blocks(&self) -> usize {
        self.header_blocks
    }

    /// Name of the decoded file, if any
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// TEC engine options in use
    pub fn tec_options(&self) -> &TecOptions {
        &self.options
    }

    /// Satellites listed in at least one record
    pub fn satellites(&self) -> impl Iterator<Item = &SV> + '_ {
        self.counts.keys()
    }

    /// Observation codes found in the data
    pub fn observables(&self) -> BTreeSet<&Observable> {
        self.records
            .iter()
            .flat_map(|record| record.observations.values())
            .flat_map(|signals| signals.keys())
            .collect()
    }

    /// Number of observations, per satellite and observation code
    pub fn observation_counts(&self) -> &BTreeMap<SV, BTreeMap<Observable, usize>> {
        &self.counts
    }

    /// Validated phase connected arcs of given satellite
    pub fn arcs(&self, sv: &SV) -> &[PhaseArc] {
        self.arcs.get(sv).map(|arcs| arcs.as_slice()).unwrap_or(&[])
    }

    /// All validated phase connected arcs
    pub fn arcs_iter(&self) -> impl Iterator<Item = (&SV, &PhaseArc)> + '_ {
        self.arcs
            .iter()
            .flat_map(|(sv, arcs)| arcs.iter().map(move |arc| (sv, arc)))
    }

    /// Iterates the records where given satellite was observed:
    /// (record index, record, observations of this satellite)
    pub fn satellite_iter<'a>(
        &'a self,
        sv: &'a SV,
    ) -> impl Iterator<Item = (usize, &'a Record, &'a SignalMap)> + 'a {
        self.records
            .iter()
            .enumerate()
            .filter_map(move |(index, record)| Some((index, record, record.signals(sv)?)))
    }

    /// Iterates one observation of one satellite, over time
    pub fn observable_iter<'a>(
        &'a self,
        sv: &'a SV,
        observable: &'a Observable,
    ) -> impl Iterator<Item = (&'a TimePoint, &'a AnnotatedValue)> + 'a {
        self.records
            .iter()
            .filter_map(move |record| Some((&record.epoch, record.get(sv, observable)?)))
    }

    /// Iterates the calibrated slant TEC of one satellite [TECU]
    pub fn tec_iter<'a>(&'a self, sv: &'a SV) -> impl Iterator<Item = (&'a TimePoint, f64)> + 'a {
        self.observable_iter(sv, &Observable::Tec)
            .map(|(t, value)| (t, value.value))
    }

    /// Phase TEC of given satellite, in given record
    pub fn ptec(&self, index: usize, sv: &SV) -> Option<f64> {
        self.records.get(index)?.ptec(sv)
    }

    /// Code TEC of given satellite, in given record
    pub fn ctec(&self, index: usize, sv: &SV) -> Option<f64> {
        self.records.get(index)?.ctec(sv)
    }

    /// Badness score of given satellite, in given record.
    /// Records out of the log are unusable.
    pub fn badness(&self, index: usize, sv: &SV) -> u32 {
        match self.records.get(index) {
            Some(record) => record.badness(sv, &self.options.badness),
            None => self.options.badness.invalid,
        }
    }
}

fn satellite_system_name(letter: char) -> &'static str {
    match letter {
        'G' => "GPS",
        'R' => "GLONASS",
        'E' => "Galileo",
        'S' => "Geostationary (SBAS)",
        'M' => "Mixed",
        _ => "Unknown",
    }
}

impl std::fmt::Display for ObservationLog {
    /// Summary of the header fields
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(filename) = &self.filename {
            writeln!(f, "File:\t\t\t{}", filename)?;
        }
        let system = self.header.satellite_system().unwrap_or('G');
        writeln!(f, "Satellite system:\t{}", satellite_system_name(system))?;
        writeln!(f, "Time system used:\t{}", self.time_system)?;
        if let Some(first) = self.header.first_observation() {
            writeln!(f, "First record time:\t{}", first)?;
        }
        if let Some(last) = self.header.last_observation() {
            writeln!(f, "Last record time:\t{}", last)?;
        }

        let leaps = self.header.entries(Field::LeapSeconds);
        if leaps.len() > 1 {
            writeln!(f, "Leap seconds:")?;
            for (nth, entry) in leaps.iter().enumerate() {
                let end = leaps
                    .get(nth + 1)
                    .map(|next| next.record)
                    .unwrap_or(self.records.len());
                writeln!(f, "\t{}\t(records {} -- {})", entry.value, entry.record, end)?;
            }
        } else if let Some(entry) = leaps.first() {
            writeln!(f, "Leap seconds:\t{}", entry.value)?;
        }

        if let Some(interval) = self.header.interval() {
            writeln!(f, "Interval:\t{}", interval)?;
        }

        let comments: Vec<&str> = self.header.comments().collect();
        if !comments.is_empty() {
            writeln!(f, "Comments ({}):", comments.len())?;
            writeln!(f, "{}", "-".repeat(60))?;
            for comment in comments {
                writeln!(f, "{}", comment)?;
            }
            writeln!(f, "{}", "-".repeat(60))?;
        }

        let satellites = self.header.satellites().unwrap_or(self.counts.len());
        writeln!(f, "{} satellites observed. Number of observations:", satellites)?;
        write!(f, "PRN")?;
        if let Some(codes) = self.header.observables_at(0) {
            for code in codes {
                write!(f, "\t{:>5}", code)?;
            }
        }
        if let Some(counts) = self.header.observation_counts() {
            for (sv, counts) in counts {
                write!(f, "\n{}", sv)?;
                for count in counts {
                    write!(f, "\t{:>5}", count)?;
                }
            }
        }
        Ok(())
    }
}
