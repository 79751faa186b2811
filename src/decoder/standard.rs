//! RINEX 2 records layout
use std::io::BufRead;

use crate::{
    columns,
    decoder::{Lines, RawObservation, RecordFormat},
    diagnostics::{Diagnostics, Warning},
    error::Error,
    observable::Observable,
    observation::LliFlags,
    parse_sv,
    prelude::SV,
};

/// Satellites per epoch line
const SATELLITES_PER_LINE: usize = 12;

/// Observations per line
const OBSERVATIONS_PER_LINE: usize = 5;

/// Width of one observation field: F14.3, LLI and STR digits
const OBSERVATION_WIDTH: usize = 16;

fn satellites_at(line: &str, count: usize) -> impl Iterator<Item = Option<SV>> + '_ {
    (0..count).map(move |s| parse_sv(columns(line, 32 + 3 * s, 35 + 3 * s)))
}

/// Parses one 16 wide observation field
fn observation(field: &str) -> Result<Option<RawObservation>, ()> {
    let value = columns(field, 0, 14).trim();
    if value.is_empty() {
        return Ok(None);
    }
    let value = value.parse::<f64>().map_err(|_| ())?;

    let lli = columns(field, 14, 15)
        .chars()
        .next()
        .and_then(LliFlags::from_digit)
        .unwrap_or_default();

    let strength = columns(field, 15, 16)
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .unwrap_or(0) as u8;

    Ok(Some(RawObservation {
        value,
        lli,
        strength,
    }))
}

/// Plain RINEX 2 records
#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct StandardFormat;

impl RecordFormat for StandardFormat {
    fn epoch_line<R: BufRead>(
        &mut self,
        lines: &mut Lines<R>,
    ) -> Result<Option<(usize, String)>, Error> {
        lines.next_line()
    }

    fn clock_offset<R: BufRead>(
        &mut self,
        epoch_line: &str,
        _: &mut Lines<R>,
        _: &mut dyn Diagnostics,
    ) -> Result<Option<f64>, Error> {
        Ok(columns(epoch_line, 68, 80).trim().parse::<f64>().ok())
    }

    fn satellites<R: BufRead>(
        &mut self,
        epoch_line: &str,
        count: usize,
        lines: &mut Lines<R>,
        _: &mut dyn Diagnostics,
    ) -> Result<Vec<Option<SV>>, Error> {
        let mut satellites = Vec::with_capacity(count);
        satellites.extend(satellites_at(epoch_line, count.min(SATELLITES_PER_LINE)));

        while satellites.len() < count {
            let line = match lines.next_line()? {
                Some((_, line)) => line,
                None => break,
            };
            let remaining = (count - satellites.len()).min(SATELLITES_PER_LINE);
            satellites.extend(satellites_at(&line, remaining));
        }
        Ok(satellites)
    }

    fn observations<R: BufRead>(
        &mut self,
        sv: Option<SV>,
        codes: &[Observable],
        lines: &mut Lines<R>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Vec<Option<RawObservation>>, Error> {
        let mut observations = Vec::with_capacity(codes.len());

        for chunk in codes.chunks(OBSERVATIONS_PER_LINE) {
            let (number, line) = match lines.next_line()? {
                Some(line) => line,
                None => break,
            };
            for (i, code) in chunk.iter().enumerate() {
                let field = columns(&line, OBSERVATION_WIDTH * i, OBSERVATION_WIDTH * (i + 1));
                match observation(field) {
                    Ok(observation) => observations.push(observation),
                    Err(_) => {
                        if let Some(sv) = sv {
                            diagnostics.warn(Warning::MalformedObservation {
                                line: number,
                                sv,
                                observable: code.clone(),
                                content: field.to_string(),
                            });
                        }
                        observations.push(None);
                    },
                }
            }
        }
        observations.resize(codes.len(), None);
        Ok(observations)
    }

    fn skip_payload<R: BufRead>(
        &mut self,
        satellites: usize,
        codes: usize,
        lines: &mut Lines<R>,
    ) -> Result<(), Error> {
        let per_satellite = (codes + OBSERVATIONS_PER_LINE - 1) / OBSERVATIONS_PER_LINE;
        lines.skip(satellites * per_satellite)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;
    use std::str::FromStr;

    #[test]
    fn observation_fields() {
        let obs = observation("  23619095.450 7").unwrap().unwrap();
        assert_eq!(obs.value, 23619095.450);
        assert!(obs.lli.is_empty());
        assert_eq!(obs.strength, 7);

        let obs = observation("    -53875.632  ").unwrap().unwrap();
        assert_eq!(obs.value, -53875.632);
        assert_eq!(obs.strength, 0);

        let obs = observation("    -53875.6325 ").unwrap().unwrap();
        assert_eq!(obs.lli, LliFlags::LOCK_LOSS | LliFlags::UNDER_ANTI_SPOOFING);

        assert_eq!(observation("                "), Ok(None));
        assert_eq!(observation(""), Ok(None));
        assert!(observation("   abcdefgh    ").is_err());
    }

    #[test]
    fn satellites_continuation() {
        let epoch = " 21  1  1  0  0 30.0000000  0 14G01G02G03G04G05G06G07G08G09G10G11G12 0.000123456";
        let content = "                                G13 14\n";
        let mut lines = Lines::new(Cursor::new(content));
        let mut format = StandardFormat;
        let mut warnings = Vec::<Warning>::new();

        let satellites = format
            .satellites(epoch, 14, &mut lines, &mut warnings)
            .unwrap();
        assert_eq!(satellites.len(), 14);
        assert_eq!(satellites[0], Some(SV::from_str("G01").unwrap()));
        assert_eq!(satellites[12], Some(SV::from_str("G13").unwrap()));
        // blank system letter is GPS
        assert_eq!(satellites[13], Some(SV::from_str("G14").unwrap()));

        let offset = format
            .clock_offset(epoch, &mut lines, &mut warnings)
            .unwrap();
        assert_eq!(offset, Some(0.000123456));
    }

    #[test]
    fn observation_lines() {
        let codes: Vec<Observable> = ["L1", "L2", "C1", "P1", "P2", "D1"]
            .iter()
            .map(|c| Observable::from_str(c).unwrap())
            .collect();
        let content = concat!(
            " 110158976.82047  85838122.35345  20962534.4704   20962534.0004   20962536.6254 \n",
            "     -1234.567  \n",
        );
        let mut lines = Lines::new(Cursor::new(content));
        let mut warnings = Vec::<Warning>::new();
        let sv = SV::from_str("G07").ok();

        let obs = StandardFormat
            .observations(sv, &codes, &mut lines, &mut warnings)
            .unwrap();
        assert_eq!(obs.len(), 6);
        let l1 = obs[0].unwrap();
        assert_eq!(l1.value, 110158976.820);
        assert_eq!(l1.strength, 7);
        assert_eq!(obs[4].unwrap().value, 20962536.625);
        assert_eq!(obs[5].unwrap().value, -1234.567);
        assert!(warnings.is_empty());

        // short last line and malformed field
        let content = " 110158976.82047        xx.1234   \n";
        let mut lines = Lines::new(Cursor::new(content));
        let obs = StandardFormat
            .observations(sv, &codes, &mut lines, &mut warnings)
            .unwrap();
        assert_eq!(obs.len(), 6);
        assert!(obs[0].is_some());
        assert!(obs[1].is_none());
        assert!(obs[5].is_none());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn cycle_slip_payload() {
        let content = "a\nb\nc\nd\ne\n";
        let mut lines = Lines::new(Cursor::new(content));
        StandardFormat.skip_payload(2, 6, &mut lines).unwrap();
        assert_eq!(lines.next_line().unwrap(), Some((5, "e".to_string())));
    }
}
