//! RINEX 2 and Compact RINEX observation decoding
use std::{
    io::BufRead,
    path::Path,
    str::FromStr,
};

use crate::{
    columns,
    diagnostics::{Diagnostics, Warning},
    epoch::{parse_epoch, Layout},
    error::Error,
    gnss_time::{TimePoint, TimeSystem},
    header::{Field, HeaderParser, HeaderStore},
    leap::LeapSecondTable,
    observable::Observable,
    observation::{AnnotatedValue, EpochFlag, LliFlags, Record, WavelengthFactor},
    observation_log::ObservationLog,
    prelude::SV,
    reader::BufferedReader,
    tec::TecOptions,
};

mod check;
mod compact;
mod standard;

use compact::CompactFormat;
use standard::StandardFormat;

/// [DecoderOptions] tune the decoding process
#[derive(Debug, Copy, Clone, Default)]
pub struct DecoderOptions {
    /// Decode as Compact RINEX, even without CRINEX header
    pub compact: bool,
    /// Satellite system letter, overriding the header declaration
    /// when picking the time system
    pub constellation: Option<char>,
    /// TEC engine options
    pub tec: TecOptions,
    /// Current instant, used to tell whether the leap second table
    /// may be outdated. None reads the system clock.
    pub now: Option<TimePoint>,
}

impl DecoderOptions {
    /// Copies and forces Compact RINEX decoding
    pub fn with_compact(&self, compact: bool) -> Self {
        let mut s = *self;
        s.compact = compact;
        s
    }

    /// Copies and overrides the satellite system ('G', 'R', 'E'..)
    pub fn with_constellation(&self, letter: char) -> Self {
        let mut s = *self;
        s.constellation = Some(letter);
        s
    }

    /// Copies and sets the current instant
    pub fn with_now(&self, now: TimePoint) -> Self {
        let mut s = *self;
        s.now = Some(now);
        s
    }

    /// Copies and sets the TEC engine options
    pub fn with_tec(&self, tec: TecOptions) -> Self {
        let mut s = *self;
        s.tec = tec;
        s
    }
}

/// Line iterator that keeps track of line numbers
pub(crate) struct Lines<R: BufRead> {
    inner: std::io::Lines<R>,
    number: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            number: 0,
        }
    }

    /// Next line and its number (starting at 1), None at end of stream
    pub fn next_line(&mut self) -> Result<Option<(usize, String)>, Error> {
        match self.inner.next() {
            None => Ok(None),
            Some(line) => {
                let mut line = line?;
                if line.ends_with('\r') {
                    line.pop();
                }
                self.number += 1;
                Ok(Some((self.number, line)))
            },
        }
    }

    /// Skips up to `count` lines
    pub fn skip(&mut self, count: usize) -> Result<(), Error> {
        for _ in 0..count {
            if self.next_line()?.is_none() {
                break;
            }
        }
        Ok(())
    }
}

/// One observation, as found in the file
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct RawObservation {
    pub value: f64,
    pub lli: LliFlags,
    pub strength: u8,
}

/// What differs between RINEX and Compact RINEX records
pub(crate) trait RecordFormat {
    /// Returns the next epoch line, recovered
    fn epoch_line<R: BufRead>(
        &mut self,
        lines: &mut Lines<R>,
    ) -> Result<Option<(usize, String)>, Error>;

    /// Receiver clock offset of the current epoch [s]
    fn clock_offset<R: BufRead>(
        &mut self,
        epoch_line: &str,
        lines: &mut Lines<R>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Option<f64>, Error>;

    /// Satellites listed by the current epoch.
    /// Unidentified satellites are None.
    fn satellites<R: BufRead>(
        &mut self,
        epoch_line: &str,
        count: usize,
        lines: &mut Lines<R>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Vec<Option<SV>>, Error>;

    /// Observations of one satellite, one per code (None when blank)
    fn observations<R: BufRead>(
        &mut self,
        sv: Option<SV>,
        codes: &[Observable],
        lines: &mut Lines<R>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Vec<Option<RawObservation>>, Error>;

    /// Skips the payload of a cycle slip record
    fn skip_payload<R: BufRead>(
        &mut self,
        satellites: usize,
        codes: usize,
        lines: &mut Lines<R>,
    ) -> Result<(), Error>;
}

/// [Decoder] turns a RINEX 2 or Compact RINEX observation stream
/// into an [ObservationLog].
/// ```
/// use rinex_tec::prelude::*;
/// let table = LeapSecondTable::builtin()
///     .unwrap();
/// let mut warnings = Vec::<Warning>::new();
/// let log = Decoder::new(&table)
///     .decode_file("test_resources/OBS/V2/brux0010.21o", &mut warnings)
///     .unwrap();
/// assert_eq!(log.len(), 40);
/// ```
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    table: &'a LeapSecondTable,
    options: DecoderOptions,
}

impl<'a> Decoder<'a> {
    /// Builds a [Decoder] with default options. The [LeapSecondTable]
    /// is used for every time system operation of this decoding process.
    pub fn new(table: &'a LeapSecondTable) -> Self {
        Self {
            table,
            options: DecoderOptions::default(),
        }
    }

    /// Copies and sets the [DecoderOptions]
    pub fn with_options(&self, options: DecoderOptions) -> Self {
        Self {
            table: self.table,
            options,
        }
    }

    /// Decodes a local file. Files ending with ".gz" are supported
    /// with the `flate2` feature.
    pub fn decode_file<P: AsRef<Path>>(
        &self,
        path: P,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<ObservationLog, Error> {
        let path = path.as_ref();
        let reader = BufferedReader::new(path)?;
        let mut log = self.decode(reader, diagnostics)?;
        log.filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        Ok(log)
    }

    /// Decodes a RINEX 2 or Compact RINEX observation stream.
    pub fn decode<R: BufRead>(
        &self,
        reader: R,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<ObservationLog, Error> {
        let mut lines = Lines::new(reader);
        let mut parser = HeaderParser::default();
        let mut header = HeaderStore::default();

        loop {
            match lines.next_line()? {
                Some((number, line)) => {
                    if parser.parse_line(&mut header, &line, number, 0, None, diagnostics)? {
                        break;
                    }
                },
                None => return Err(Error::MissingHeaderDelimiter),
            }
        }

        let (system, base_year) = self.time_setup(&mut header)?;
        log::debug!("time system: {}, base year: {:?}", system, base_year);

        let mut log = ObservationLog::new(header, system, self.options.tec);
        let body = Body {
            parser,
            system,
            base_year,
            in_motion: false,
        };

        if self.options.compact || log.header.is_crinex() {
            body.decode(CompactFormat::default(), &mut lines, &mut log, diagnostics)?;
        } else {
            body.decode(StandardFormat, &mut lines, &mut log, diagnostics)?;
        }

        check::check(&mut log, self.table, self.options.now, diagnostics)?;
        log.calibrate();
        Ok(log)
    }

    /// Picks the time system of the records, and attaches it to the
    /// header instants. Returns the time system, and the year
    /// to complete 2 digit years with.
    fn time_setup(&self, header: &mut HeaderStore) -> Result<(TimeSystem, Option<i32>), Error> {
        let letter = self
            .options
            .constellation
            .or_else(|| header.satellite_system())
            .unwrap_or('G');

        let declared = |field: Field| -> Result<Option<TimeSystem>, Error> {
            match header.current(field).and_then(|value| value.as_text()) {
                Some(text) if !text.is_empty() => Ok(Some(TimeSystem::from_str(text)?)),
                _ => Ok(None),
            }
        };

        let first = declared(Field::FirstObservationSystem)?;
        let last = declared(Field::LastObservationSystem)?;

        let system = match (first, last) {
            (Some(first), Some(last)) if first != last => {
                return Err(Error::TimeSystemMismatch { first, last });
            },
            (Some(system), _) | (None, Some(system)) => system,
            (None, None) => TimeSystem::from_constellation_code(letter),
        };

        header.attach_time_system(Field::FirstObservation, system);
        header.attach_time_system(Field::LastObservation, system);

        let base_year = header
            .first_observation()
            .or_else(|| header.last_observation())
            .map(|t| t.year());

        Ok((system, base_year))
    }
}

/*
 * Blank integer fields are null
 */
fn integer(content: &str) -> Option<usize> {
    let content = content.trim();
    if content.is_empty() {
        Some(0)
    } else {
        content.parse::<usize>().ok()
    }
}

/// Records decoding state
struct Body {
    parser: HeaderParser,
    system: TimeSystem,
    base_year: Option<i32>,
    in_motion: bool,
}

impl Body {
    fn decode<F: RecordFormat, R: BufRead>(
        mut self,
        mut format: F,
        lines: &mut Lines<R>,
        log: &mut ObservationLog,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<(), Error> {
        loop {
            let (number, line) = match format.epoch_line(lines)? {
                Some(epoch_line) => epoch_line,
                None => return Ok(()),
            };

            if line.trim().is_empty() {
                continue;
            }

            let flag = match EpochFlag::from_str(columns(&line, 28, 29)) {
                Ok(flag) => flag,
                Err(_) => {
                    diagnostics.warn(Warning::UnknownEventFlag {
                        line: number,
                        flag: columns(&line, 28, 29).to_string(),
                    });
                    continue;
                },
            };

            let count = match integer(columns(&line, 29, 32)) {
                Some(count) => count,
                None => {
                    diagnostics.warn(Warning::MalformedEpoch {
                        line: number,
                        content: line.clone(),
                    });
                    continue;
                },
            };

            let epoch = match parse_epoch(&line, Layout::Record, self.base_year, Some(self.system)) {
                Ok(epoch) => epoch,
                Err(e) => {
                    log::debug!("line {}: {}", number, e);
                    None
                },
            };

            match flag {
                EpochFlag::CycleSlip => {
                    let satellites = format.satellites(&line, count, lines, diagnostics)?;
                    for sv in satellites.into_iter().flatten() {
                        log.break_phase(sv);
                    }
                    let codes = log
                        .header
                        .observables_at(log.len())
                        .map(|codes| codes.len())
                        .unwrap_or(0);
                    format.skip_payload(count, codes, lines)?;
                },
                EpochFlag::AntennaBeingMoved
                | EpochFlag::NewSiteOccupation
                | EpochFlag::HeaderInformationFollows
                | EpochFlag::ExternalEvent => {
                    match flag {
                        EpochFlag::AntennaBeingMoved => self.in_motion = true,
                        EpochFlag::NewSiteOccupation => self.in_motion = false,
                        _ => {},
                    }
                    let event = if flag == EpochFlag::ExternalEvent {
                        epoch
                    } else {
                        None
                    };
                    self.header_block(count, event, lines, log, diagnostics)?;
                },
                EpochFlag::Ok | EpochFlag::PowerFailure => {
                    self.record(
                        &mut format,
                        number,
                        &line,
                        flag,
                        count,
                        epoch,
                        lines,
                        log,
                        diagnostics,
                    )?;
                },
            }
        }
    }

    /// Header lines found along the records
    fn header_block<R: BufRead>(
        &mut self,
        count: usize,
        epoch: Option<crate::gnss_time::TimePoint>,
        lines: &mut Lines<R>,
        log: &mut ObservationLog,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<(), Error> {
        if count > 0 {
            log.header_blocks += 1;
            log::debug!("header block at record #{} ({} lines)", log.len(), count);
        }
        let record = log.len();
        for _ in 0..count {
            let (number, line) = match lines.next_line()? {
                Some(line) => line,
                None => break,
            };
            if self
                .parser
                .parse_line(&mut log.header, &line, number, record, epoch, diagnostics)?
            {
                break;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn record<F: RecordFormat, R: BufRead>(
        &mut self,
        format: &mut F,
        number: usize,
        line: &str,
        flag: EpochFlag,
        count: usize,
        epoch: Option<crate::gnss_time::TimePoint>,
        lines: &mut Lines<R>,
        log: &mut ObservationLog,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<(), Error> {
        let index = log.len();
        let codes = match log.header.observables_at(index) {
            Some(codes) => codes.to_vec(),
            None => return Err(Error::MissingObservables(number)),
        };
        let wavelengths = log
            .header
            .wavelengths_at(index)
            .cloned()
            .unwrap_or_default();

        let clock_offset = format.clock_offset(line, lines, diagnostics)?;
        let satellites = format.satellites(line, count, lines, diagnostics)?;

        let mut record = epoch.map(|epoch| {
            Record::new(epoch)
                .with_power_failure(flag == EpochFlag::PowerFailure)
                .with_motion(self.in_motion)
                .with_clock_offset(clock_offset)
        });

        for sv in satellites {
            let observations = format.observations(sv, &codes, lines, diagnostics)?;
            let (sv, record) = match (sv, record.as_mut()) {
                (Some(sv), Some(record)) => (sv, record),
                _ => continue,
            };

            let counts = log.counts.entry(sv).or_default();
            for (code, observation) in codes.iter().zip(observations) {
                let observation = match observation {
                    Some(observation) => observation,
                    None => continue,
                };
                let ambiguity = wavelengths.ambiguity(&sv, code.frequency().unwrap_or(0));
                let wave_factor =
                    WavelengthFactor::resolve(sv, code, observation.lli, ambiguity);
                record.insert(
                    sv,
                    code.clone(),
                    AnnotatedValue::annotated(
                        observation.value,
                        observation.lli,
                        wave_factor,
                        observation.strength,
                    ),
                );
                *counts.entry(code.clone()).or_default() += 1;
            }
        }

        match record {
            Some(record) => log.push_record(record),
            None => diagnostics.warn(Warning::MalformedEpoch {
                line: number,
                content: line.to_string(),
            }),
        }
        Ok(())
    }
}
