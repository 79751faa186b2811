//! Recoverable decoding issues and where they go
use crate::{gnss_time::TimePoint, observable::Observable, prelude::SV, version::Version};
use thiserror::Error;

/// [Warning]s describe content level issues: the decoder reports them
/// and moves on, using the value derived from the data.
#[derive(Error, Debug, Clone)]
pub enum Warning {
    #[error("line {line}: unknown header label \"{label}\"")]
    UnknownLabel { line: usize, label: String },
    #[error("line {line}: header label \"{found}\" interpreted as \"{label}\"")]
    FuzzyLabel {
        line: usize,
        found: String,
        label: &'static str,
    },
    #[error("line {line}: \"{label}\" redefined, previous value replaced")]
    HeaderReplaced { line: usize, label: &'static str },
    #[error("line {line}: \"{label}\" may not be redefined, new value ignored")]
    HeaderIgnored { line: usize, label: &'static str },
    #[error("line {line}: {sv} repeated in PRN / # OF OBS")]
    RepeatedSatellite { line: usize, sv: SV },
    #[error("line {line}: observation codes continued without beginning")]
    ObsCodesContinuation { line: usize },
    #[error("line {line}: more observation codes than announced")]
    ObsCodesOverflow { line: usize },
    #[error("RINEX revision {0} is newer than supported, decoding anyway")]
    NewerVersion(Version),
    #[error("line {line}: malformed \"{label}\" content \"{content}\"")]
    MalformedHeaderField {
        line: usize,
        label: &'static str,
        content: String,
    },
    #[error("line {line}: malformed epoch \"{content}\"")]
    MalformedEpoch { line: usize, content: String },
    #[error("line {line}: malformed {sv} {observable} observation \"{content}\"")]
    MalformedObservation {
        line: usize,
        sv: SV,
        observable: Observable,
        content: String,
    },
    #[error("line {line}: {sv} {observable} differential arc is not initialized")]
    UninitializedArc {
        line: usize,
        sv: SV,
        observable: Observable,
    },
    #[error("line {line}: clock offset differential arc is not initialized")]
    UninitializedClockArc { line: usize },
    #[error("line {line}: unknown event flag \"{flag}\"")]
    UnknownEventFlag { line: usize, flag: String },
    #[error("observation log is empty")]
    EmptyLog,
    #[error("TIME OF FIRST OBS ({header}) does not match first record ({data})")]
    FirstObservationMismatch { header: TimePoint, data: TimePoint },
    #[error("TIME OF LAST OBS ({header}) does not match last record ({data})")]
    LastObservationMismatch { header: TimePoint, data: TimePoint },
    #[error("LEAP SECONDS ({header}) differ from leap second table ({table}), table possibly stale: {stale}")]
    LeapSecondsMismatch {
        header: i64,
        table: i64,
        stale: bool,
    },
    #[error("leap second dataset updated {updated}, after current time {now}")]
    LeapTableAhead { updated: TimePoint, now: TimePoint },
    #[error("INTERVAL ({header}s) does not match observed interval ({data}s)")]
    IntervalMismatch { header: f64, data: f64 },
    #[error("# OF SATELLITES ({header}) does not match observed satellites ({data})")]
    SatelliteCountMismatch { header: usize, data: usize },
    #[error("satellites listed in header but never observed: {0:?}")]
    SatellitesNotObserved(Vec<SV>),
    #[error("satellites observed but not listed in header: {0:?}")]
    SatellitesNotListed(Vec<SV>),
    #[error("{sv} {observable}: {header} observations announced, {data} found")]
    ObservationCountMismatch {
        sv: SV,
        observable: Observable,
        header: usize,
        data: usize,
    },
}

/// Sink for [Warning]s, passed to the decoder
pub trait Diagnostics {
    fn warn(&mut self, warning: Warning);
}

/// Forwards [Warning]s to the `log` facade
#[derive(Debug, Default, Copy, Clone)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
    }
}

/// Collects [Warning]s for later inspection
impl Diagnostics for Vec<Warning> {
    fn warn(&mut self, warning: Warning) {
        self.push(warning);
    }
}
