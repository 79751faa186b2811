use thiserror::Error;

use crate::{
    epoch::ParsingError as EpochParsingError, gnss_time::Error as TimeError,
    gnss_time::TimeSystem, hatanaka::Error as HatanakaError, leap::Error as LeapError,
    version::Error as VersionError,
};

/// Fatal errors: decoding stops and no log is returned.
/// Content level issues are [crate::diagnostics::Warning]s instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("leap second table: {0}")]
    LeapSeconds(#[from] LeapError),
    #[error("time system: {0}")]
    TimeSystem(#[from] TimeError),
    #[error("version: {0}")]
    Version(#[from] VersionError),
    #[error("compact rinex: {0}")]
    Hatanaka(#[from] HatanakaError),
    #[error("epoch: {0}")]
    Epoch(#[from] EpochParsingError),
    #[error("not an observation file (type \"{0}\")")]
    NotObservationData(String),
    #[error("non supported Compact RINEX revision \"{0}\"")]
    CrinexVersion(String),
    #[error("TIME OF FIRST OBS ({first}) and TIME OF LAST OBS ({last}) disagree")]
    TimeSystemMismatch { first: TimeSystem, last: TimeSystem },
    #[error("line {0}: observation record prior any observation codes definition")]
    MissingObservables(usize),
    #[error("missing END OF HEADER")]
    MissingHeaderDelimiter,
}
