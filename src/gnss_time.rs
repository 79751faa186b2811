//! Time systems (UTC, TAI, GPS) and time-system aware instants
use crate::leap::LeapSecondTable;

use hifitime::{Duration, Epoch, TimeScale, Unit};
use thiserror::Error;

use std::{cmp::Ordering, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// GPS time is steered 19s behind TAI
const GPST_TAI_OFFSET_SECONDS: f64 = 19.0;

/// Time systems related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("cannot compare a naive instant to a time system aware instant")]
    NaiveComparison,
    #[error("instant is not attached to any time system")]
    NaiveInstant,
    #[error("TAI versus UTC is not defined prior 1958")]
    PriorTai,
    #[error("invalid calendar date: {0}")]
    InvalidDate(String),
    #[error("unknown time system \"{0}\"")]
    UnknownTimeSystem(String),
    #[error("system clock: {0}")]
    SystemClock(String),
}

/// Time systems we can express observations in
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeSystem {
    /// Coordinated Universal Time, used by Glonass
    UTC,
    /// International Atomic Time, used by Galileo
    TAI,
    /// GPS time: TAI - 19s
    GPS,
}

impl TimeSystem {
    /// Default time system of a receiver, from its
    /// primary constellation letter ('R' Glonass, 'E' Galileo, else GPS)
    pub fn from_constellation_code(code: char) -> Self {
        match code {
            'R' => Self::UTC,
            'E' => Self::TAI,
            _ => Self::GPS,
        }
    }
}

impl std::fmt::Display for TimeSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::UTC => write!(f, "UTC"),
            Self::TAI => write!(f, "TAI"),
            Self::GPS => write!(f, "GPS"),
        }
    }
}

impl FromStr for TimeSystem {
    type Err = Error;
    /// Parses either a time system name, or the
    /// constellation descriptor found in RINEX headers
    /// (GPS, GLO and GAL)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GPS" => Ok(Self::GPS),
            "UTC" | "GLO" => Ok(Self::UTC),
            "TAI" | "GAL" => Ok(Self::TAI),
            other => Err(Error::UnknownTimeSystem(other.to_string())),
        }
    }
}

impl From<TimeSystem> for TimeScale {
    fn from(system: TimeSystem) -> Self {
        match system {
            TimeSystem::UTC => TimeScale::UTC,
            TimeSystem::TAI => TimeScale::TAI,
            TimeSystem::GPS => TimeScale::GPST,
        }
    }
}

/// [TimePoint] is a calendar instant with microsecond resolution,
/// either attached to a [TimeSystem] or naive. Naive instants
/// only compare to other naive instants.
/// Instants expressed in different time systems compare through
/// their TAI equivalent, which requires a [LeapSecondTable]: see
/// [TimePoint::try_cmp] and [TimePoint::try_eq].
#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimePoint {
    /// Wall clock (calendar) fields, carried by a uniform [Epoch]
    wall: Epoch,
    /// Attached time system, None for naive instants
    system: Option<TimeSystem>,
}

fn calendar(y: i32, m: u8, d: u8, hh: u8, mm: u8, ss: u8, micros: u32) -> Result<Epoch, Error> {
    if micros >= 1_000_000 {
        return Err(Error::InvalidDate(format!("{} microseconds", micros)));
    }
    Epoch::maybe_from_gregorian_tai(y, m, d, hh, mm, ss, micros * 1000)
        .map_err(|e| Error::InvalidDate(e.to_string()))
}

impl TimePoint {
    /// Builds a [TimePoint] in given [TimeSystem]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        y: i32,
        m: u8,
        d: u8,
        hh: u8,
        mm: u8,
        ss: u8,
        micros: u32,
        system: TimeSystem,
    ) -> Result<Self, Error> {
        let wall = calendar(y, m, d, hh, mm, ss, micros)?;
        Ok(Self::from_wall(wall, Some(system)))
    }

    /// Builds a naive [TimePoint], not attached to any time system
    pub fn naive(
        y: i32,
        m: u8,
        d: u8,
        hh: u8,
        mm: u8,
        ss: u8,
        micros: u32,
    ) -> Result<Self, Error> {
        let wall = calendar(y, m, d, hh, mm, ss, micros)?;
        Ok(Self::from_wall(wall, None))
    }

    /// Current UTC instant, read from the system clock
    pub fn now() -> Result<Self, Error> {
        let now = Epoch::now().map_err(|e| Error::SystemClock(e.to_string()))?;
        let (y, m, d, hh, mm, ss, ns) = now.to_gregorian_utc();
        Self::new(y, m, d, hh, mm, ss, ns / 1000, TimeSystem::UTC)
    }

    /// Builds a [TimePoint] from calendar fields and fractional seconds,
    /// rounded to the nearest microsecond.
    pub fn from_fractional_seconds(
        y: i32,
        m: u8,
        d: u8,
        hh: u8,
        mm: u8,
        seconds: f64,
        system: Option<TimeSystem>,
    ) -> Result<Self, Error> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::InvalidDate(format!("{} seconds", seconds)));
        }
        let wall = calendar(y, m, d, hh, mm, 0, 0)?;
        let micros = (seconds * 1.0E6).round() as i64;
        Ok(Self::from_wall(wall + micros * Unit::Microsecond, system))
    }

    pub(crate) fn from_wall(wall: Epoch, system: Option<TimeSystem>) -> Self {
        Self { wall, system }
    }

    pub(crate) fn wall(&self) -> Epoch {
        self.wall
    }

    /// Returns attached [TimeSystem], None when naive
    pub fn system(&self) -> Option<TimeSystem> {
        self.system
    }

    /// True if this instant is not attached to any time system
    pub fn is_naive(&self) -> bool {
        self.system.is_none()
    }

    /// Copies and (re)attaches this instant to given [TimeSystem],
    /// calendar fields are preserved.
    pub fn with_system(&self, system: TimeSystem) -> Self {
        Self::from_wall(self.wall, Some(system))
    }

    /// Copies and detaches this instant from its time system,
    /// calendar fields are preserved.
    pub fn to_naive(&self) -> Self {
        Self::from_wall(self.wall, None)
    }

    /// Returns (year, month, day, hours, minutes, seconds, microseconds)
    pub fn to_gregorian(&self) -> (i32, u8, u8, u8, u8, u8, u32) {
        let (y, m, d, hh, mm, ss, ns) = self.wall.to_gregorian_tai();
        (y, m, d, hh, mm, ss, ns / 1000)
    }

    /// Calendar year
    pub fn year(&self) -> i32 {
        self.to_gregorian().0
    }

    /// Offset between this time system and UTC, at this instant.
    /// Returns None for naive instants.
    pub fn utc_offset(&self, table: &LeapSecondTable) -> Result<Option<Duration>, Error> {
        match self.system {
            None => Ok(None),
            Some(TimeSystem::UTC) => Ok(Some(Duration::ZERO)),
            Some(TimeSystem::TAI) => {
                self.check_tai_validity()?;
                Ok(Some(table.offset_at_utc(self.wall)))
            },
            Some(TimeSystem::GPS) => {
                self.check_tai_validity()?;
                Ok(Some(
                    table.offset_at_utc(self.wall) - GPST_TAI_OFFSET_SECONDS * Unit::Second,
                ))
            },
        }
    }

    fn check_tai_validity(&self) -> Result<(), Error> {
        if self.wall < Epoch::from_gregorian_tai_at_midnight(1958, 1, 1) {
            Err(Error::PriorTai)
        } else {
            Ok(())
        }
    }

    /// Converts to continuous TAI, used as the common ground
    /// to compare and subtract instants.
    pub(crate) fn to_tai(&self, table: &LeapSecondTable) -> Result<Epoch, Error> {
        match self.system {
            None => Err(Error::NaiveInstant),
            Some(TimeSystem::UTC) => Ok(self.wall + table.offset_at_utc(self.wall)),
            Some(TimeSystem::TAI) => {
                self.check_tai_validity()?;
                Ok(self.wall)
            },
            Some(TimeSystem::GPS) => {
                self.check_tai_validity()?;
                Ok(self.wall + GPST_TAI_OFFSET_SECONDS * Unit::Second)
            },
        }
    }

    /// Expresses this instant in another [TimeSystem].
    /// Fails on naive instants.
    pub fn to_system(
        &self,
        target: TimeSystem,
        table: &LeapSecondTable,
    ) -> Result<Self, Error> {
        if self.system == Some(target) {
            return Ok(*self);
        }
        let tai = self.to_tai(table)?;
        let wall = match target {
            TimeSystem::TAI => tai,
            TimeSystem::GPS => tai - GPST_TAI_OFFSET_SECONDS * Unit::Second,
            TimeSystem::UTC => table.utc_from_tai(tai),
        };
        Ok(Self::from_wall(wall, Some(target)))
    }

    /// Compares two instants. Instants attached to different
    /// time systems are compared in TAI. Comparing a naive instant
    /// to an aware instant is an error.
    pub fn try_cmp(&self, rhs: &Self, table: &LeapSecondTable) -> Result<Ordering, Error> {
        match (self.system, rhs.system) {
            (None, None) => Ok(self.wall.cmp(&rhs.wall)),
            (None, Some(_)) | (Some(_), None) => Err(Error::NaiveComparison),
            (Some(lhs), Some(other)) if lhs == other => Ok(self.wall.cmp(&rhs.wall)),
            _ => Ok(self.to_tai(table)?.cmp(&rhs.to_tai(table)?)),
        }
    }

    /// Equality, across time systems. See [TimePoint::try_cmp].
    pub fn try_eq(&self, rhs: &Self, table: &LeapSecondTable) -> Result<bool, Error> {
        Ok(self.try_cmp(rhs, table)? == Ordering::Equal)
    }

    /// Returns self - rhs, as a physical [Duration] (leap seconds
    /// in between are accounted for).
    pub fn try_sub(&self, rhs: &Self, table: &LeapSecondTable) -> Result<Duration, Error> {
        match (self.system, rhs.system) {
            (None, None) => Ok(self.wall - rhs.wall),
            (None, Some(_)) | (Some(_), None) => Err(Error::NaiveComparison),
            _ => Ok(self.to_tai(table)? - rhs.to_tai(table)?),
        }
    }

    /// GPS epoch: 1980-01-06 00:00:00 GPST
    fn gps_origin() -> Epoch {
        Epoch::from_gregorian_tai_at_midnight(1980, 1, 6)
    }

    fn elapsed_gps(&self, table: &LeapSecondTable) -> Result<Duration, Error> {
        let gps = self.to_system(TimeSystem::GPS, table)?;
        Ok(gps.wall - Self::gps_origin())
    }

    /// Seconds elapsed since the GPS epoch, in GPS time
    pub fn gps_seconds(&self, table: &LeapSecondTable) -> Result<f64, Error> {
        Ok(self.elapsed_gps(table)?.to_seconds())
    }

    /// Number of complete weeks elapsed since the GPS epoch
    pub fn gps_week(&self, table: &LeapSecondTable) -> Result<i64, Error> {
        let days = self.elapsed_gps(table)?.to_unit(Unit::Day);
        Ok((days / 7.0).floor() as i64)
    }

    /// GPS day of week, 0 being sunday
    pub fn gps_day_of_week(&self, table: &LeapSecondTable) -> Result<u8, Error> {
        let days = self.elapsed_gps(table)?.to_unit(Unit::Day).floor() as i64;
        Ok(days.rem_euclid(7) as u8)
    }

    /// Seconds elapsed since the beginning of the current GPS week
    pub fn gps_second_of_week(&self, table: &LeapSecondTable) -> Result<f64, Error> {
        let week = self.gps_week(table)?;
        let elapsed = self.elapsed_gps(table)? - (week * 7) * Unit::Day;
        Ok(elapsed.to_seconds())
    }

    /// Builds a GPS [TimePoint] from a GPS week number
    /// and a second of week
    pub fn from_gps_week(week: i64, second_of_week: f64) -> Self {
        let micros = (second_of_week * 1.0E6).round() as i64;
        let wall = Self::gps_origin() + (week * 7) * Unit::Day + micros * Unit::Microsecond;
        Self::from_wall(wall, Some(TimeSystem::GPS))
    }
}

impl std::ops::Add<Duration> for TimePoint {
    type Output = Self;
    /// Moves the wall clock forward, within the same time system.
    fn add(self, rhs: Duration) -> Self {
        Self::from_wall(self.wall + rhs, self.system)
    }
}

impl std::ops::Sub<Duration> for TimePoint {
    type Output = Self;
    fn sub(self, rhs: Duration) -> Self {
        Self::from_wall(self.wall - rhs, self.system)
    }
}

impl std::fmt::Display for TimePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (y, m, d, hh, mm, ss, us) = self.to_gregorian();
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
            y, m, d, hh, mm, ss, us
        )?;
        if let Some(system) = self.system {
            write!(f, " {}", system)?;
        }
        Ok(())
    }
}
