//! Leap second table: UTC instants and the cumulative TAI - UTC offset
//! that applies from each of them onward.
use crate::gnss_time::{self, TimePoint, TimeSystem};

use hifitime::{Duration, Epoch};
use regex::Regex;
use thiserror::Error;

use std::{collections::BTreeMap, path::Path, str::FromStr};

/// Builtin dataset, shipped with the crate
const BUILTIN_DATASET: &str = include_str!("../data/leapseco.dat");

lazy_static! {
    static ref ENTRY: Regex = Regex::new(r"^([0-9:/-]+) : ([0-9.-]+)$").unwrap();
    static ref UPDATED: Regex = Regex::new(r"^Updated: ([0-9]{4})/([0-9]{2})/([0-9]{2})$").unwrap();
}

/// Leap second table related errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("leap second dataset not available")]
    Io(#[from] std::io::Error),
    #[error("leap second dataset holds no entry")]
    EmptyTable,
    #[error("invalid leap second entry \"{0}\"")]
    InvalidEntry(String),
    #[error("leap second offsets must not decrease (\"{0}\")")]
    NonMonotonic(String),
}

/// [LeapSecondTable] maps UTC instants to the TAI - UTC offset
/// valid from that instant onward. It is built once (from a cached
/// dataset or the builtin one) and then only read. Refreshing it means
/// building a new table and swapping it where the caller keeps it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeapSecondTable {
    /// Date of the last refresh, when the dataset says so
    updated: Option<Epoch>,
    /// UTC wall clock instant => TAI - UTC
    entries: BTreeMap<Epoch, Duration>,
}

impl LeapSecondTable {
    /// Loads the table from a cached dataset file.
    /// A missing or unreadable file is an error: no time system
    /// can be built without a table.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Returns the table shipped with this crate.
    pub fn builtin() -> Result<Self, Error> {
        Self::from_str(BUILTIN_DATASET)
    }

    /// Number of leap second entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if this table has no entry at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Date of the last update, as declared by the dataset
    pub fn last_update(&self) -> Option<TimePoint> {
        self.updated
            .map(|wall| TimePoint::from_wall(wall, Some(TimeSystem::UTC)))
    }

    /// Iterates (UTC instant, TAI - UTC) entries in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (TimePoint, Duration)> + '_ {
        self.entries
            .iter()
            .map(|(wall, offset)| (TimePoint::from_wall(*wall, Some(TimeSystem::UTC)), *offset))
    }

    /// TAI - UTC at given UTC wall clock instant: offset of the latest
    /// entry at or before that instant, null before the first entry.
    pub(crate) fn offset_at_utc(&self, utc: Epoch) -> Duration {
        self.entries
            .range(..=utc)
            .next_back()
            .map(|(_, offset)| *offset)
            .unwrap_or(Duration::ZERO)
    }

    /// Converts a continuous TAI instant back to the UTC wall clock.
    pub(crate) fn utc_from_tai(&self, tai: Epoch) -> Epoch {
        let offset = self
            .entries
            .iter()
            .rev()
            .find(|(utc, offset)| **utc + **offset <= tai)
            .map(|(_, offset)| *offset)
            .unwrap_or(Duration::ZERO);
        tai - offset
    }

    /// Leap second entries strictly contained in the ]start, end[ UTC interval
    pub(crate) fn entries_between(
        &self,
        start: Epoch,
        end: Epoch,
    ) -> impl Iterator<Item = (Epoch, Duration)> + '_ {
        self.entries
            .iter()
            .filter(move |(utc, _)| **utc > start && **utc < end)
            .map(|(utc, offset)| (*utc, *offset))
    }

    /// Returns true if a leap second may have been published since this
    /// table was last updated. New leap seconds only take effect on
    /// January 1st or July 1st, so a table updated before the latest of
    /// these dates (relative to `now`) is possibly stale.
    /// A table without update date is always considered stale,
    /// a table updated after `now` never is.
    pub fn is_stale(&self, now: &TimePoint) -> Result<bool, gnss_time::Error> {
        let updated = match self.updated {
            Some(updated) => updated,
            None => return Ok(true),
        };

        let now = match now.system() {
            Some(_) => now.to_system(TimeSystem::UTC, self)?,
            None => *now,
        };

        if updated > now.wall() {
            return Ok(false);
        }

        let (year, month, _, _, _, _, _) = updated.to_gregorian_tai();
        let target = if month <= 6 {
            Epoch::from_gregorian_tai_at_midnight(year, 7, 1)
        } else {
            Epoch::from_gregorian_tai_at_midnight(year + 1, 1, 1)
        };

        Ok(now.wall() > target)
    }
}

/// Parses "YYYY/MM/DD-HH:MM:SS"
fn parse_instant(content: &str) -> Option<Epoch> {
    let (date, time) = content.split_once('-')?;
    let mut date = date.split('/');
    let y = date.next()?.parse::<i32>().ok()?;
    let m = date.next()?.parse::<u8>().ok()?;
    let d = date.next()?.parse::<u8>().ok()?;

    let mut time = time.split(':');
    let hh = time.next()?.parse::<u8>().ok()?;
    let mm = time.next()?.parse::<u8>().ok()?;
    let ss = time.next()?.parse::<u8>().ok()?;

    Epoch::maybe_from_gregorian_tai(y, m, d, hh, mm, ss, 0).ok()
}

impl FromStr for LeapSecondTable {
    type Err = Error;
    /// Parses the human readable dataset: one optional
    /// "Updated: YYYY/MM/DD" line, then "YYYY/MM/DD-HH:MM:SS : offset" lines.
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let mut table = Self::default();

        for line in content.lines() {
            let line = line.trim_end();

            if let Some(caps) = UPDATED.captures(line) {
                let y = caps[1].parse::<i32>();
                let m = caps[2].parse::<u8>();
                let d = caps[3].parse::<u8>();
                if let (Ok(y), Ok(m), Ok(d)) = (y, m, d) {
                    table.updated = Epoch::maybe_from_gregorian_tai(y, m, d, 0, 0, 0, 0).ok();
                }
                if table.updated.is_none() {
                    log::warn!("leap second dataset in invalid format: \"{}\"", line);
                }
                continue;
            }

            if let Some(caps) = ENTRY.captures(line) {
                let instant = parse_instant(&caps[1])
                    .ok_or_else(|| Error::InvalidEntry(line.to_string()))?;
                let offset = caps[2]
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidEntry(line.to_string()))?;
                table.entries.insert(instant, Duration::from_seconds(offset));
            }
        }

        if table.entries.is_empty() {
            return Err(Error::EmptyTable);
        }

        let mut previous = Duration::MIN;
        for (instant, offset) in table.entries.iter() {
            if *offset < previous {
                return Err(Error::NonMonotonic(instant.to_string()));
            }
            previous = *offset;
        }

        Ok(table)
    }
}
