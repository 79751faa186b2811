#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

#[macro_use]
extern crate lazy_static;

pub mod decoder;
pub mod diagnostics;
pub mod ephemeris;
pub mod epoch;
pub mod gnss_time;
pub mod hatanaka;
pub mod header;
pub mod leap;
pub mod observable;
pub mod observation;
pub mod tec;
pub mod version;

mod error;
mod observation_log;
mod reader;

#[cfg(test)]
mod tests;

use std::str::FromStr;

/// Package to include all basic structures
pub mod prelude {
    pub use crate::{
        decoder::{Decoder, DecoderOptions},
        diagnostics::{Diagnostics, LogDiagnostics, Warning},
        ephemeris::{EphemerisSource, Position},
        error::Error,
        gnss_time::{TimePoint, TimeSystem},
        header::{Field, HeaderStore, HeaderValue},
        leap::LeapSecondTable,
        observable::Observable,
        observation::{AnnotatedValue, EpochFlag, LliFlags, Record, WavelengthFactor},
        observation_log::ObservationLog,
        tec::{BadnessPolicy, PhaseArc, TecOptions},
        version::Version,
    };
    // pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch};
}

pub use error::Error;
pub use observation_log::ObservationLog;

use prelude::{Constellation, SV};

/// Returns `line[start..end]`, clamped to the line length.
/// Lines are ASCII: anything else yields an empty field.
pub(crate) fn columns(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("")
}

/// Parses a 3 character satellite identifier, a blank
/// system letter being GPS ("G01", " 1", "R24")
pub(crate) fn parse_sv(content: &str) -> Option<SV> {
    let mut chars = content.chars();
    let constellation = match chars.next()? {
        ' ' => Constellation::GPS,
        c => Constellation::from_str(&c.to_string()).ok()?,
    };
    let prn = chars.as_str().trim().parse::<u8>().ok()?;
    Some(SV::new(constellation, prn))
}
