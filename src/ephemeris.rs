//! Satellite positions provided by the caller (SP3 readers..)
use crate::{
    error::Error,
    gnss_time::TimePoint,
    leap::LeapSecondTable,
    observation_log::ObservationLog,
    prelude::SV,
};

/// ECEF coordinates [m]
pub type Position = (f64, f64, f64);

/// [EphemerisSource] must be implemented to attach satellite positions
/// to an [ObservationLog]. Positions are requested per satellite at
/// an absolute GPS second (elapsed since 1980-01-06 00:00:00 GPST).
/// Return None when the position cannot be determined.
pub trait EphemerisSource {
    fn position(&self, sv: SV, gps_seconds: f64) -> Option<Position>;
}

impl<F> EphemerisSource for F
where
    F: Fn(SV, f64) -> Option<Position>,
{
    fn position(&self, sv: SV, gps_seconds: f64) -> Option<Position> {
        self(sv, gps_seconds)
    }
}

impl ObservationLog {
    /// Positions of given satellite, at every record where it was observed:
    /// (record index, epoch, position). Records for which the [EphemerisSource]
    /// has no answer are omitted.
    pub fn satellite_positions<E: EphemerisSource>(
        &self,
        sv: SV,
        source: &E,
        table: &LeapSecondTable,
    ) -> Result<Vec<(usize, TimePoint, Position)>, Error> {
        let mut positions = Vec::new();
        for (index, record, _) in self.satellite_iter(&sv) {
            let seconds = record.epoch.gps_seconds(table)?;
            if let Some(position) = source.position(sv, seconds) {
                positions.push((index, record.epoch, position));
            }
        }
        Ok(positions)
    }
}
