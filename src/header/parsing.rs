//! Line by line header decoding
use std::{collections::BTreeMap, str::FromStr};

use crate::{
    columns,
    diagnostics::{Diagnostics, Warning},
    epoch::{parse_epoch, Layout},
    error::Error,
    gnss_time::TimePoint,
    header::{
        labels::{is_end_of_header, lookup, Conversion, FieldSpec, LabelDescriptor, END_OF_HEADER},
        Field, FieldKind, HeaderEntry, HeaderStore, HeaderValue, RepeatPolicy, WavelengthTable,
    },
    observable::Observable,
    parse_sv,
    prelude::SV,
    version::Version,
};

/// Observation codes per `# / TYPES OF OBSERV` line
const CODES_PER_LINE: usize = 9;

/// Observation counts per `PRN / # OF OBS` line
const COUNTS_PER_LINE: usize = 9;

/// Satellites per `WAVELENGTH FACT L1/2` line
const WAVELENGTH_SATELLITES: usize = 7;

/// Supported Compact RINEX revision
const CRINEX_VERSION: &str = "1.0";

/// Pending `# / TYPES OF OBSERV` declaration
#[derive(Debug, Clone)]
struct PendingObservables {
    expected: usize,
    codes: Vec<Observable>,
}

/// [HeaderParser] holds the continuation state of multi line
/// header declarations. One instance lives for the whole decoding
/// process, since header blocks may be found along the records.
#[derive(Debug, Default)]
pub(crate) struct HeaderParser {
    observables: Option<PendingObservables>,
    counts_sv: Option<SV>,
}

/// Location of the line being parsed
struct LineContext<'a> {
    line: usize,
    record: usize,
    epoch: Option<TimePoint>,
    label: &'a LabelDescriptor,
}

impl LineContext<'_> {
    fn entry(&self, value: HeaderValue) -> HeaderEntry {
        HeaderEntry {
            value,
            record: self.record,
            line: self.line,
            epoch: self.epoch,
        }
    }
    fn malformed(&self, content: &str) -> Warning {
        Warning::MalformedHeaderField {
            line: self.line,
            label: self.label.label,
            content: content.to_string(),
        }
    }
}

/*
 * Blank numerical fields are null
 */
fn integer(content: &str) -> Option<i64> {
    let content = content.trim();
    if content.is_empty() {
        Some(0)
    } else {
        content.parse::<i64>().ok()
    }
}

fn float(content: &str) -> Option<f64> {
    let content = content.trim();
    if content.is_empty() {
        Some(0.0)
    } else {
        content.parse::<f64>().ok()
    }
}

impl HeaderParser {
    /// Parses one header line into `store`.
    /// `record` is the index of the record that follows this header
    /// (0 for the file header) and `epoch` the significant epoch of
    /// an external event, if any.
    /// Returns true once END OF HEADER is found.
    pub fn parse_line(
        &mut self,
        store: &mut HeaderStore,
        line: &str,
        line_number: usize,
        record: usize,
        epoch: Option<TimePoint>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<bool, Error> {
        let label = columns(line, 60, 80).trim_end();

        if let Some(fuzzy) = is_end_of_header(label) {
            if fuzzy {
                diagnostics.warn(Warning::FuzzyLabel {
                    line: line_number,
                    found: label.to_string(),
                    label: END_OF_HEADER,
                });
            }
            return Ok(true);
        }

        let (descriptor, fuzzy) = match lookup(label) {
            Some(found) => found,
            None => {
                diagnostics.warn(Warning::UnknownLabel {
                    line: line_number,
                    label: label.to_string(),
                });
                return Ok(false);
            },
        };

        if fuzzy {
            diagnostics.warn(Warning::FuzzyLabel {
                line: line_number,
                found: label.to_string(),
                label: descriptor.label,
            });
        }

        let ctx = LineContext {
            line: line_number,
            record,
            epoch,
            label: descriptor,
        };

        if let FieldKind::Single(policy) = descriptor.kind {
            let first = descriptor.fields[0].field;
            let continued = first == Field::ObservationCounts;
            if store.contains(first) && !continued {
                match policy {
                    RepeatPolicy::Forbidden => {
                        diagnostics.warn(Warning::HeaderIgnored {
                            line: line_number,
                            label: descriptor.label,
                        });
                        return Ok(false);
                    },
                    RepeatPolicy::WarnAndReplace => {
                        diagnostics.warn(Warning::HeaderReplaced {
                            line: line_number,
                            label: descriptor.label,
                        });
                    },
                    RepeatPolicy::Replace => {},
                }
            }
        }

        let content = columns(line, 0, 60);
        for spec in descriptor.fields {
            self.parse_field(store, &ctx, spec, content, diagnostics)?;
        }
        Ok(false)
    }

    fn parse_field(
        &mut self,
        store: &mut HeaderStore,
        ctx: &LineContext,
        spec: &FieldSpec,
        content: &str,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<(), Error> {
        let field_content = columns(content, spec.start, spec.end);
        let value = match spec.conversion {
            Conversion::Text => {
                let text = field_content.trim();
                if text.is_empty() && spec.field != ctx.label.fields[0].field {
                    // optional trailing fields
                    return Ok(());
                }
                HeaderValue::Text(text.to_string())
            },
            Conversion::Integer => match integer(field_content) {
                Some(value) => HeaderValue::Integer(value),
                None => {
                    diagnostics.warn(ctx.malformed(field_content));
                    return Ok(());
                },
            },
            Conversion::Float => match float(field_content) {
                Some(value) => HeaderValue::Float(value),
                None => {
                    diagnostics.warn(ctx.malformed(field_content));
                    return Ok(());
                },
            },
            Conversion::Triplet => {
                let x = float(columns(field_content, 0, 14));
                let y = float(columns(field_content, 14, 28));
                let z = float(columns(field_content, 28, 42));
                match (x, y, z) {
                    (Some(x), Some(y), Some(z)) => HeaderValue::Triplet((x, y, z)),
                    _ => {
                        diagnostics.warn(ctx.malformed(field_content));
                        return Ok(());
                    },
                }
            },
            Conversion::Time => match parse_epoch(field_content, Layout::Header, None, None) {
                Ok(Some(t)) => HeaderValue::Time(t),
                Ok(None) | Err(_) => {
                    diagnostics.warn(ctx.malformed(field_content));
                    return Ok(());
                },
            },
            Conversion::Present => HeaderValue::Flag(true),
            Conversion::CrinexVersion => {
                let version = field_content.trim();
                if version != CRINEX_VERSION {
                    return Err(Error::CrinexVersion(version.to_string()));
                }
                HeaderValue::Text(version.to_string())
            },
            Conversion::Version => {
                let version = Version::from_str(field_content)?;
                version.check_supported()?;
                if version.is_newer_than_supported() {
                    diagnostics.warn(Warning::NewerVersion(version));
                }
                HeaderValue::Version(version)
            },
            Conversion::FileType => {
                let file_type = field_content.trim();
                if file_type != "O" {
                    return Err(Error::NotObservationData(file_type.to_string()));
                }
                HeaderValue::Char('O')
            },
            Conversion::SatelliteSystem => match field_content.chars().next() {
                Some(' ') | None => HeaderValue::Char('G'),
                Some(c) => HeaderValue::Char(c),
            },
            Conversion::Observables => {
                match self.parse_observables(ctx, field_content, diagnostics) {
                    Some(codes) => HeaderValue::Observables(codes),
                    None => return Ok(()),
                }
            },
            Conversion::Wavelengths => {
                let current = store.wavelengths_at(ctx.record).cloned().unwrap_or_default();
                match Self::parse_wavelengths(ctx, current, field_content, diagnostics) {
                    Some(table) => HeaderValue::Wavelengths(table),
                    None => return Ok(()),
                }
            },
            Conversion::ObservationCounts => {
                let current = store.observation_counts().cloned().unwrap_or_default();
                match self.parse_counts(ctx, current, field_content, diagnostics) {
                    Some(counts) => HeaderValue::ObservationCounts(counts),
                    None => return Ok(()),
                }
            },
        };

        store.store(spec.field, &ctx.label.kind, ctx.entry(value));
        Ok(())
    }

    /// `# / TYPES OF OBSERV`: returns the list declared so far
    fn parse_observables(
        &mut self,
        ctx: &LineContext,
        content: &str,
        diagnostics: &mut dyn Diagnostics,
    ) -> Option<Vec<Observable>> {
        let count = columns(content, 0, 6).trim();
        let mut pending = if count.is_empty() {
            match self.observables.take() {
                Some(pending) => pending,
                None => {
                    diagnostics.warn(Warning::ObsCodesContinuation { line: ctx.line });
                    return None;
                },
            }
        } else {
            match count.parse::<usize>() {
                Ok(expected) => PendingObservables {
                    expected,
                    codes: Vec::with_capacity(expected),
                },
                Err(_) => {
                    diagnostics.warn(ctx.malformed(content));
                    self.observables = None;
                    return None;
                },
            }
        };

        for nth in 0..CODES_PER_LINE {
            let start = 6 * nth + 10;
            let code = columns(content, start, start + 2).trim();
            if code.is_empty() {
                continue;
            }
            if pending.codes.len() == pending.expected {
                diagnostics.warn(Warning::ObsCodesOverflow { line: ctx.line });
                break;
            }
            match Observable::from_str(code) {
                Ok(observable) => pending.codes.push(observable),
                Err(_) => {
                    diagnostics.warn(ctx.malformed(content));
                    self.observables = None;
                    return None;
                },
            }
        }

        let codes = pending.codes.clone();
        if pending.codes.len() < pending.expected {
            self.observables = Some(pending);
        } else {
            self.observables = None;
        }
        Some(codes)
    }

    /// `WAVELENGTH FACT L1/2`: updates the current table
    fn parse_wavelengths(
        ctx: &LineContext,
        mut table: WavelengthTable,
        content: &str,
        diagnostics: &mut dyn Diagnostics,
    ) -> Option<WavelengthTable> {
        let l1 = integer(columns(content, 0, 6));
        let l2 = integer(columns(content, 6, 12));
        let n = integer(columns(content, 12, 18));

        // factors are 0 (does not apply), 1 or 2
        let factor = |value: Option<i64>| value.and_then(|v| u8::try_from(v).ok()).filter(|f| *f <= 2);
        let count = n.and_then(|n| usize::try_from(n).ok());

        let (l1, l2, n) = match (factor(l1), factor(l2), count) {
            (Some(l1), Some(l2), Some(n)) => (l1, l2, n),
            _ => {
                diagnostics.warn(ctx.malformed(content));
                return None;
            },
        };

        if n == 0 {
            table.set_all(l1, l2);
            return Some(table);
        }

        for nth in 0..n.min(WAVELENGTH_SATELLITES) {
            let start = 21 + 6 * nth;
            match parse_sv(columns(content, start, start + 3)) {
                Some(sv) => table.set(sv, l1, l2),
                None => {
                    diagnostics.warn(ctx.malformed(content));
                    return None;
                },
            }
        }
        Some(table)
    }

    /// `PRN / # OF OBS`: accumulates counts of the current satellite
    fn parse_counts(
        &mut self,
        ctx: &LineContext,
        mut counts: BTreeMap<SV, Vec<usize>>,
        content: &str,
        diagnostics: &mut dyn Diagnostics,
    ) -> Option<BTreeMap<SV, Vec<usize>>> {
        let prn = columns(content, 3, 6);
        let sv = if prn.trim().is_empty() {
            match self.counts_sv {
                Some(sv) => sv,
                None => {
                    diagnostics.warn(ctx.malformed(content));
                    return None;
                },
            }
        } else {
            let sv = match parse_sv(prn) {
                Some(sv) => sv,
                None => {
                    diagnostics.warn(ctx.malformed(content));
                    self.counts_sv = None;
                    return None;
                },
            };
            if counts.remove(&sv).is_some() {
                diagnostics.warn(Warning::RepeatedSatellite { line: ctx.line, sv });
            }
            self.counts_sv = Some(sv);
            sv
        };

        let list = counts.entry(sv).or_default();
        for nth in 0..COUNTS_PER_LINE {
            let start = 6 + 6 * nth;
            let count = columns(content, start, start + 6).trim();
            if count.is_empty() {
                break;
            }
            match count.parse::<usize>() {
                Ok(count) => list.push(count),
                Err(_) => {
                    diagnostics.warn(ctx.malformed(content));
                    break;
                },
            }
        }
        Some(counts)
    }
}
