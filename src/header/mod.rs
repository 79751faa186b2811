//! Header fields store
use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{
    gnss_time::{TimePoint, TimeSystem},
    observable::Observable,
    prelude::SV,
    version::Version,
};

mod labels;
mod parsing;
mod wavelength;

pub(crate) use labels::{lookup, FieldKind, RepeatPolicy};
pub(crate) use parsing::HeaderParser;
pub use wavelength::WavelengthTable;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Header fields we know of
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Field {
    /// Compact RINEX revision
    CrinexVersion,
    /// Set when Compact RINEX headers were found
    Crinex,
    /// Compression program
    CrinexProgram,
    /// Compression date
    CrinexDate,
    /// RINEX revision
    Version,
    /// RINEX file type
    FileType,
    /// Satellite system letter
    SatelliteSystem,
    /// Program that created this file
    Program,
    /// Agency that created this file
    RunBy,
    /// Date of creation
    Date,
    Comment,
    MarkerName,
    MarkerNumber,
    /// Approximate marker position, ECEF WGS84 [m]
    MarkerPosition,
    Observer,
    Agency,
    ReceiverNumber,
    ReceiverType,
    ReceiverVersion,
    AntennaNumber,
    AntennaType,
    /// Antenna (H, E, N) shift from marker position [m]
    AntennaDelta,
    /// Wavelength factors table
    WavelengthFactors,
    /// Observation codes
    Observables,
    /// Nominal sampling interval [s]
    Interval,
    FirstObservation,
    FirstObservationSystem,
    LastObservation,
    LastObservationSystem,
    /// Receiver clock offset applied to epochs and observations
    ClockOffsetApplied,
    /// GPS - UTC [s]
    LeapSeconds,
    /// Number of satellites
    Satellites,
    /// Number of observations, per satellite and observation code
    ObservationCounts,
}

/// Decoded header value
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HeaderValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Triplet((f64, f64, f64)),
    Char(char),
    Flag(bool),
    Version(Version),
    Time(TimePoint),
    Observables(Vec<Observable>),
    Wavelengths(WavelengthTable),
    ObservationCounts(BTreeMap<SV, Vec<usize>>),
}

impl HeaderValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
    pub fn as_triplet(&self) -> Option<(f64, f64, f64)> {
        match self {
            Self::Triplet(t) => Some(*t),
            _ => None,
        }
    }
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }
    pub fn as_time(&self) -> Option<&TimePoint> {
        match self {
            Self::Time(t) => Some(t),
            _ => None,
        }
    }
    pub fn as_observables(&self) -> Option<&[Observable]> {
        match self {
            Self::Observables(codes) => Some(codes),
            _ => None,
        }
    }
    pub fn as_wavelengths(&self) -> Option<&WavelengthTable> {
        match self {
            Self::Wavelengths(table) => Some(table),
            _ => None,
        }
    }
    pub fn as_observation_counts(&self) -> Option<&BTreeMap<SV, Vec<usize>>> {
        match self {
            Self::ObservationCounts(counts) => Some(counts),
            _ => None,
        }
    }
}

impl std::fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Triplet((x, y, z)) => write!(f, "({}, {}, {})", x, y, z),
            Self::Char(c) => write!(f, "{}", c),
            Self::Flag(b) => write!(f, "{}", b),
            Self::Version(v) => write!(f, "{}", v),
            Self::Time(t) => write!(f, "{}", t),
            Self::Observables(codes) => write!(f, "{}", codes.iter().join(", ")),
            Self::Wavelengths(table) => write!(f, "{} declarations", table.iter().count()),
            Self::ObservationCounts(counts) => write!(f, "{} satellites", counts.len()),
        }
    }
}

/// [HeaderEntry] is one stored header value and where it came from
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaderEntry {
    pub value: HeaderValue,
    /// Index of the first record this value applies to
    pub record: usize,
    /// Line number (starting at 1) this value was read from,
    /// 0 for values deduced from the data
    pub line: usize,
    /// Significant epoch of an external event, if any
    pub epoch: Option<TimePoint>,
}

impl HeaderEntry {
    pub fn new(value: HeaderValue, record: usize, line: usize) -> Self {
        Self {
            value,
            record,
            line,
            epoch: None,
        }
    }
    /// Copies and attaches an external event epoch
    pub fn with_epoch(&self, epoch: Option<TimePoint>) -> Self {
        let mut s = self.clone();
        s.epoch = epoch;
        s
    }
}

/// Storage semantics of a header field
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Slot {
    /// Single current value
    Single(HeaderEntry),
    /// Values valid from their record index onward,
    /// in increasing record index order
    Scoped(Vec<HeaderEntry>),
    /// Accumulated values
    Log(Vec<HeaderEntry>),
}

impl Slot {
    fn entries(&self) -> &[HeaderEntry] {
        match self {
            Self::Single(entry) => std::slice::from_ref(entry),
            Self::Scoped(entries) | Self::Log(entries) => entries,
        }
    }
}

/// [HeaderStore] holds every header field, either found in the
/// file header, in header blocks found along the records,
/// or deduced from the data once decoded.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaderStore {
    slots: BTreeMap<Field, Slot>,
}

impl HeaderStore {
    /// True if this field was defined at least once
    pub fn contains(&self, field: Field) -> bool {
        self.slots.contains_key(&field)
    }

    /// Raw storage of given field
    pub fn slot(&self, field: Field) -> Option<&Slot> {
        self.slots.get(&field)
    }

    /// Iterates all fields
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &Slot)> + '_ {
        self.slots.iter()
    }

    /// All stored entries of given field, in order
    pub fn entries(&self, field: Field) -> &[HeaderEntry] {
        self.slots.get(&field).map(|s| s.entries()).unwrap_or(&[])
    }

    /// Latest entry of given field
    pub fn current_entry(&self, field: Field) -> Option<&HeaderEntry> {
        self.entries(field).last()
    }

    /// Latest value of given field: the "currently defined" value
    pub fn current(&self, field: Field) -> Option<&HeaderValue> {
        self.current_entry(field).map(|e| &e.value)
    }

    /// Earliest value of given field: the "first defined" value
    pub fn first(&self, field: Field) -> Option<&HeaderValue> {
        self.entries(field).first().map(|e| &e.value)
    }

    /// Value of given field that applies to given record index:
    /// latest entry defined at or before that record.
    pub fn at(&self, field: Field, record: usize) -> Option<&HeaderValue> {
        match self.slots.get(&field)? {
            Slot::Single(entry) => Some(&entry.value),
            Slot::Scoped(entries) | Slot::Log(entries) => entries
                .iter()
                .rev()
                .find(|e| e.record <= record)
                .map(|e| &e.value),
        }
    }

    /// Defines a single valued field, replacing former value
    pub(crate) fn set_single(&mut self, field: Field, entry: HeaderEntry) {
        self.slots.insert(field, Slot::Single(entry));
    }

    /// Defines a time scoped field. An entry at the same record index
    /// replaces the former one.
    pub(crate) fn set_scoped(&mut self, field: Field, entry: HeaderEntry) {
        let slot = self
            .slots
            .entry(field)
            .or_insert_with(|| Slot::Scoped(Vec::new()));
        if let Slot::Scoped(entries) = slot {
            match entries.binary_search_by(|e| e.record.cmp(&entry.record)) {
                Ok(index) => entries[index] = entry,
                Err(index) => entries.insert(index, entry),
            }
        }
    }

    /// Appends a value to a log field
    pub(crate) fn append(&mut self, field: Field, entry: HeaderEntry) {
        let slot = self
            .slots
            .entry(field)
            .or_insert_with(|| Slot::Log(Vec::new()));
        if let Slot::Log(entries) = slot {
            entries.push(entry);
        }
    }

    /// Stores a value with given semantics
    pub(crate) fn store(&mut self, field: Field, kind: &FieldKind, entry: HeaderEntry) {
        match kind {
            FieldKind::Single(_) => self.set_single(field, entry),
            FieldKind::TimeScoped => self.set_scoped(field, entry),
            FieldKind::Log => self.append(field, entry),
        }
    }

    /// Applies given time system to stored instants
    pub(crate) fn attach_time_system(&mut self, field: Field, system: TimeSystem) {
        if let Some(Slot::Single(entry)) = self.slots.get_mut(&field) {
            if let HeaderValue::Time(t) = &entry.value {
                entry.value = HeaderValue::Time(t.with_system(system));
            }
        }
    }

    /// RINEX revision
    pub fn version(&self) -> Option<Version> {
        match self.current(Field::Version)? {
            HeaderValue::Version(v) => Some(*v),
            _ => None,
        }
    }

    /// True if Compact RINEX headers were found
    pub fn is_crinex(&self) -> bool {
        self.contains(Field::Crinex)
    }

    /// Satellite system letter ('G' when not specified)
    pub fn satellite_system(&self) -> Option<char> {
        self.current(Field::SatelliteSystem)?.as_char()
    }

    /// Observation codes that apply to given record index
    pub fn observables_at(&self, record: usize) -> Option<&[Observable]> {
        self.at(Field::Observables, record)?.as_observables()
    }

    /// Wavelength factors that apply to given record index
    pub fn wavelengths_at(&self, record: usize) -> Option<&WavelengthTable> {
        self.at(Field::WavelengthFactors, record)?.as_wavelengths()
    }

    /// TIME OF FIRST OBS
    pub fn first_observation(&self) -> Option<&TimePoint> {
        self.current(Field::FirstObservation)?.as_time()
    }

    /// TIME OF LAST OBS
    pub fn last_observation(&self) -> Option<&TimePoint> {
        self.current(Field::LastObservation)?.as_time()
    }

    /// Shortest declared sampling interval [s]
    pub fn interval(&self) -> Option<f64> {
        self.entries(Field::Interval)
            .iter()
            .filter_map(|e| e.value.as_float())
            .reduce(f64::min)
    }

    /// GPS - UTC [s] that applies to given record index
    pub fn leap_seconds_at(&self, record: usize) -> Option<i64> {
        self.at(Field::LeapSeconds, record)?.as_integer()
    }

    /// Number of satellites
    pub fn satellites(&self) -> Option<usize> {
        self.current(Field::Satellites)?
            .as_integer()
            .map(|n| n.max(0) as usize)
    }

    /// Number of observations, per satellite and observation code
    pub fn observation_counts(&self) -> Option<&BTreeMap<SV, Vec<usize>>> {
        self.current(Field::ObservationCounts)?
            .as_observation_counts()
    }

    /// Comments, in order of appearance
    pub fn comments(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries(Field::Comment)
            .iter()
            .filter_map(|e| e.value.as_text())
    }

    /// Marker name that applies to given record index
    pub fn marker_name_at(&self, record: usize) -> Option<&str> {
        self.at(Field::MarkerName, record)?.as_text()
    }

    /// Approximate marker position that applies to given record index
    pub fn marker_position_at(&self, record: usize) -> Option<(f64, f64, f64)> {
        self.at(Field::MarkerPosition, record)?.as_triplet()
    }
}
