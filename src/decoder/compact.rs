//! Compact RINEX (CRINEX 1) records layout
use std::{collections::HashMap, io::BufRead};

use crate::{
    columns,
    decoder::{Lines, RawObservation, RecordFormat},
    diagnostics::{Diagnostics, Warning},
    error::Error,
    hatanaka::{DiffArc, Error as HatanakaError, TextDiff, Token},
    observable::Observable,
    observation::LliFlags,
    parse_sv,
    prelude::SV,
};

/// Compression state of one satellite: one arc per observation code,
/// and one kernel per LLI and STR flag
#[derive(Debug, Clone, Default)]
struct SatelliteArcs {
    values: Vec<DiffArc>,
    lli: Vec<TextDiff>,
    strength: Vec<TextDiff>,
}

impl SatelliteArcs {
    fn resize(&mut self, size: usize) {
        self.values.resize_with(size, DiffArc::default);
        self.lli.resize_with(size, || TextDiff::new("0"));
        self.strength.resize_with(size, || TextDiff::new("0"));
    }
}

/// Compact RINEX records: every line is recovered against
/// its previous state
#[derive(Debug, Clone, Default)]
pub(crate) struct CompactFormat {
    epoch: TextDiff,
    clock: DiffArc,
    satellites: HashMap<SV, SatelliteArcs>,
}

impl CompactFormat {
    /// Recovers one flag digit
    fn flag(kernel: &mut TextDiff, data: Option<char>) -> Option<char> {
        let data = data.map(|c| c.to_string()).unwrap_or_default();
        kernel.decompress(&data).chars().next()
    }
}

impl RecordFormat for CompactFormat {
    fn epoch_line<R: BufRead>(
        &mut self,
        lines: &mut Lines<R>,
    ) -> Result<Option<(usize, String)>, Error> {
        loop {
            let (number, line) = match lines.next_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with('&') {
                self.epoch.force_init(&line.replace('&', " "));
            } else {
                self.epoch.decompress(&line);
            }
            return Ok(Some((number, self.epoch.value().to_string())));
        }
    }

    fn clock_offset<R: BufRead>(
        &mut self,
        _: &str,
        lines: &mut Lines<R>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Option<f64>, Error> {
        let (number, line) = match lines.next_line()? {
            Some(line) => line,
            None => return Ok(None),
        };
        let token = match Token::parse(&line) {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(None),
            Err(e) => {
                log::debug!("line {}: {}", number, e);
                diagnostics.warn(Warning::UninitializedClockArc { line: number });
                return Ok(None);
            },
        };
        match self.clock.update(token) {
            Ok(value) => Ok(Some(value as f64 / 1.0E9)),
            Err(_) => {
                diagnostics.warn(Warning::UninitializedClockArc { line: number });
                Ok(None)
            },
        }
    }

    fn satellites<R: BufRead>(
        &mut self,
        epoch_line: &str,
        count: usize,
        _: &mut Lines<R>,
        _: &mut dyn Diagnostics,
    ) -> Result<Vec<Option<SV>>, Error> {
        Ok((0..count)
            .map(|s| parse_sv(columns(epoch_line, 32 + 3 * s, 35 + 3 * s)))
            .collect())
    }

    fn observations<R: BufRead>(
        &mut self,
        sv: Option<SV>,
        codes: &[Observable],
        lines: &mut Lines<R>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Vec<Option<RawObservation>>, Error> {
        let numobs = codes.len();
        let mut observations = vec![None; numobs];

        let (number, line) = match lines.next_line()? {
            Some(line) => line,
            None => return Ok(observations),
        };

        let sv = match sv {
            Some(sv) => sv,
            None => return Ok(observations),
        };

        let arcs = self.satellites.entry(sv).or_default();
        arcs.resize(numobs);

        let mut tokens = line.splitn(numobs + 1, ' ');
        let mut values = Vec::with_capacity(numobs);

        for (i, code) in codes.iter().enumerate() {
            let token = tokens.next().unwrap_or("");
            let token = match Token::parse(token) {
                Ok(Some(token)) => token,
                Ok(None) => {
                    arcs.values[i].reset();
                    values.push(None);
                    continue;
                },
                Err(_) => {
                    diagnostics.warn(Warning::MalformedObservation {
                        line: number,
                        sv,
                        observable: code.clone(),
                        content: token.to_string(),
                    });
                    arcs.values[i].reset();
                    values.push(None);
                    continue;
                },
            };
            match arcs.values[i].update(token) {
                Ok(value) => values.push(Some(value as f64 / 1.0E3)),
                Err(HatanakaError::UninitializedArc) => {
                    diagnostics.warn(Warning::UninitializedArc {
                        line: number,
                        sv,
                        observable: code.clone(),
                    });
                    values.push(None);
                },
                Err(e) => {
                    log::debug!("line {}: {}", number, e);
                    diagnostics.warn(Warning::MalformedObservation {
                        line: number,
                        sv,
                        observable: code.clone(),
                        content: format!("{:?}", token),
                    });
                    values.push(None);
                },
            }
        }

        // LLI and STR digits follow the values, two per code
        let flags: Vec<char> = tokens.next().unwrap_or("").chars().collect();

        for (i, value) in values.into_iter().enumerate() {
            let lli = Self::flag(&mut arcs.lli[i], flags.get(2 * i).copied());
            let strength = Self::flag(&mut arcs.strength[i], flags.get(2 * i + 1).copied());
            if let Some(value) = value {
                observations[i] = Some(RawObservation {
                    value,
                    lli: lli.and_then(LliFlags::from_digit).unwrap_or_default(),
                    strength: strength.and_then(|c| c.to_digit(10)).unwrap_or(0) as u8,
                });
            }
        }
        Ok(observations)
    }

    fn skip_payload<R: BufRead>(
        &mut self,
        satellites: usize,
        _: usize,
        lines: &mut Lines<R>,
    ) -> Result<(), Error> {
        lines.skip(satellites)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;
    use std::str::FromStr;

    fn codes(codes: &[&str]) -> Vec<Observable> {
        codes
            .iter()
            .map(|c| Observable::from_str(c).unwrap())
            .collect()
    }

    #[test]
    fn epoch_lines() {
        let content = concat!(
            "&21  1  1  0  0  0.0000000  0  2G01G02\n",
            "\n",
            "                3\n",
            "              1                3      R03\n",
        );
        let mut lines = Lines::new(Cursor::new(content));
        let mut format = CompactFormat::default();

        let (number, line) = format.epoch_line(&mut lines).unwrap().unwrap();
        assert_eq!(number, 1);
        assert_eq!(line, " 21  1  1  0  0  0.0000000  0  2G01G02");

        let (number, line) = format.epoch_line(&mut lines).unwrap().unwrap();
        assert_eq!(number, 3);
        assert_eq!(line, " 21  1  1  0  0 30.0000000  0  2G01G02");

        let (_, line) = format.epoch_line(&mut lines).unwrap().unwrap();
        assert_eq!(line, " 21  1  1  0  1 30.0000000  0  3G01G02R03");

        let mut warnings = Vec::<Warning>::new();
        let satellites = format
            .satellites(&line, 3, &mut lines, &mut warnings)
            .unwrap();
        assert_eq!(satellites[2], SV::from_str("R03").ok());

        assert!(format.epoch_line(&mut lines).unwrap().is_none());
    }

    #[test]
    fn clock_offsets() {
        let content = "\n-1000\n2&123456789\n1000\n\n";
        let mut lines = Lines::new(Cursor::new(content));
        let mut format = CompactFormat::default();
        let mut warnings = Vec::<Warning>::new();

        let mut next = || format.clock_offset("", &mut lines, &mut warnings).unwrap();
        assert_eq!(next(), None);
        assert_eq!(next(), None);
        assert_eq!(next(), Some(0.123456789));
        assert_eq!(next(), Some(0.123457789));
        assert_eq!(next(), None);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], Warning::UninitializedClockArc { line: 2 }));
    }

    #[test]
    fn observation_arcs() {
        let codes = codes(&["L1", "L2", "C1"]);
        let content = concat!(
            "3&20123456789 3&-53875632 3&20962534470  8 7 \n",
            "12345 10 xx   1\n",
            "1 1 5\n",
            "3 \n",
        );
        let mut lines = Lines::new(Cursor::new(content));
        let mut format = CompactFormat::default();
        let mut warnings = Vec::<Warning>::new();
        let g01 = SV::from_str("G01").ok();

        let obs = format
            .observations(g01, &codes, &mut lines, &mut warnings)
            .unwrap();
        let l1 = obs[0].unwrap();
        assert_eq!(l1.value, 20123456.789);
        assert!(l1.lli.is_empty());
        assert_eq!(l1.strength, 8);
        let l2 = obs[1].unwrap();
        assert_eq!(l2.value, -53875.632);
        assert_eq!(l2.strength, 7);
        assert_eq!(obs[2].unwrap().value, 20962534.470);
        assert_eq!(obs[2].unwrap().strength, 0);

        // malformed C1 token, lost lock on L2
        let obs = format
            .observations(g01, &codes, &mut lines, &mut warnings)
            .unwrap();
        assert_eq!(obs[0].unwrap().value, 20123469.134);
        assert_eq!(obs[0].unwrap().strength, 8);
        assert_eq!(obs[1].unwrap().value, -53875.622);
        assert!(obs[1].unwrap().lli.contains(LliFlags::LOCK_LOSS));
        assert_eq!(obs[1].unwrap().strength, 7);
        assert!(obs[2].is_none());
        assert!(matches!(warnings[0], Warning::MalformedObservation { .. }));

        // C1 arc was reset
        let obs = format
            .observations(g01, &codes, &mut lines, &mut warnings)
            .unwrap();
        assert!(obs[0].is_some());
        assert!(obs[1].is_some());
        assert!(obs[2].is_none());
        assert!(matches!(warnings[1], Warning::UninitializedArc { .. }));

        // blank L2: arc is interrupted
        let obs = format
            .observations(g01, &codes, &mut lines, &mut warnings)
            .unwrap();
        assert!(obs[0].is_some());
        assert!(obs[1].is_none());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn cycle_slip_payload() {
        let mut lines = Lines::new(Cursor::new("a\nb\nc\n"));
        CompactFormat::default()
            .skip_payload(2, 12, &mut lines)
            .unwrap();
        assert_eq!(lines.next_line().unwrap(), Some((3, "c".to_string())));
    }
}
