//! Header labels registry: for each label, the storage semantics
//! and the fixed width fields it carries.
use std::collections::HashMap;

use crate::header::Field;

/// What to do when a single valued header is encountered again
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum RepeatPolicy {
    /// Warn and replace former value
    WarnAndReplace,
    /// Warn and keep former value
    Forbidden,
    /// Replace former value silently
    Replace,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum FieldKind {
    /// One current value
    Single(RepeatPolicy),
    /// Values valid from the current record index onward
    TimeScoped,
    /// Accumulated values
    Log,
}

/// How to interpret the content of a field
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Conversion {
    /// Trimmed text
    Text,
    /// Integer number, blank is 0
    Integer,
    /// Floating point number, blank is 0
    Float,
    /// Three 14 wide floating point numbers
    Triplet,
    /// Header form date
    Time,
    /// Presence flag, ignores the content
    Present,
    /// Compact RINEX revision, must be 1.0
    CrinexVersion,
    /// RINEX revision, must be 2.XX
    Version,
    /// RINEX file type, must be 'O'
    FileType,
    /// Satellite system letter, blank is 'G'
    SatelliteSystem,
    /// Observation codes, possibly continued
    Observables,
    /// Wavelength factors declaration
    Wavelengths,
    /// Number of observations for one satellite, possibly continued
    ObservationCounts,
}

#[derive(Debug)]
pub(crate) struct FieldSpec {
    pub field: Field,
    pub start: usize,
    pub end: usize,
    pub conversion: Conversion,
}

#[derive(Debug)]
pub(crate) struct LabelDescriptor {
    pub label: &'static str,
    pub kind: FieldKind,
    pub fields: &'static [FieldSpec],
}

macro_rules! field {
    ($field: ident, $start: expr, $end: expr, $conversion: ident) => {
        FieldSpec {
            field: Field::$field,
            start: $start,
            end: $end,
            conversion: Conversion::$conversion,
        }
    };
}

use FieldKind::{Log, Single, TimeScoped};
use RepeatPolicy::{Forbidden, Replace, WarnAndReplace};

pub(crate) static LABELS: &[LabelDescriptor] = &[
    LabelDescriptor {
        label: "CRINEX VERS   / TYPE",
        kind: Single(WarnAndReplace),
        fields: &[
            field!(CrinexVersion, 0, 3, CrinexVersion),
            field!(Crinex, 0, 0, Present),
        ],
    },
    LabelDescriptor {
        label: "CRINEX PROG / DATE",
        kind: Single(WarnAndReplace),
        fields: &[
            field!(CrinexProgram, 0, 20, Text),
            field!(CrinexDate, 40, 60, Text),
            field!(Crinex, 0, 0, Present),
        ],
    },
    LabelDescriptor {
        label: "RINEX VERSION / TYPE",
        kind: Single(WarnAndReplace),
        fields: &[
            field!(Version, 0, 9, Version),
            field!(FileType, 20, 21, FileType),
            field!(SatelliteSystem, 40, 41, SatelliteSystem),
        ],
    },
    LabelDescriptor {
        label: "PGM / RUN BY / DATE",
        kind: Single(WarnAndReplace),
        fields: &[
            field!(Program, 0, 20, Text),
            field!(RunBy, 20, 40, Text),
            field!(Date, 40, 60, Text),
        ],
    },
    LabelDescriptor {
        label: "COMMENT",
        kind: Log,
        fields: &[field!(Comment, 0, 60, Text)],
    },
    LabelDescriptor {
        label: "MARKER NAME",
        kind: TimeScoped,
        fields: &[field!(MarkerName, 0, 60, Text)],
    },
    LabelDescriptor {
        label: "MARKER NUMBER",
        kind: TimeScoped,
        fields: &[field!(MarkerNumber, 0, 20, Text)],
    },
    LabelDescriptor {
        label: "APPROX POSITION XYZ",
        kind: TimeScoped,
        fields: &[field!(MarkerPosition, 0, 42, Triplet)],
    },
    LabelDescriptor {
        label: "OBSERVER / AGENCY",
        kind: Single(WarnAndReplace),
        fields: &[
            field!(Observer, 0, 20, Text),
            field!(Agency, 20, 60, Text),
        ],
    },
    LabelDescriptor {
        label: "REC # / TYPE / VERS",
        kind: Single(WarnAndReplace),
        fields: &[
            field!(ReceiverNumber, 0, 20, Text),
            field!(ReceiverType, 20, 40, Text),
            field!(ReceiverVersion, 40, 60, Text),
        ],
    },
    LabelDescriptor {
        label: "ANT # / TYPE",
        kind: TimeScoped,
        fields: &[
            field!(AntennaNumber, 0, 20, Text),
            field!(AntennaType, 20, 40, Text),
        ],
    },
    LabelDescriptor {
        label: "ANTENNA: DELTA H/E/N",
        kind: TimeScoped,
        fields: &[field!(AntennaDelta, 0, 42, Triplet)],
    },
    LabelDescriptor {
        label: "WAVELENGTH FACT L1/2",
        kind: TimeScoped,
        fields: &[field!(WavelengthFactors, 0, 60, Wavelengths)],
    },
    LabelDescriptor {
        label: "# / TYPES OF OBSERV",
        kind: TimeScoped,
        fields: &[field!(Observables, 0, 60, Observables)],
    },
    LabelDescriptor {
        label: "INTERVAL",
        kind: TimeScoped,
        fields: &[field!(Interval, 0, 10, Float)],
    },
    LabelDescriptor {
        label: "TIME OF FIRST OBS",
        kind: Single(Forbidden),
        fields: &[
            field!(FirstObservation, 0, 43, Time),
            field!(FirstObservationSystem, 48, 51, Text),
        ],
    },
    LabelDescriptor {
        label: "TIME OF LAST OBS",
        kind: Single(WarnAndReplace),
        fields: &[
            field!(LastObservation, 0, 43, Time),
            field!(LastObservationSystem, 48, 51, Text),
        ],
    },
    LabelDescriptor {
        label: "RCV CLOCK OFFS APPL",
        kind: TimeScoped,
        fields: &[field!(ClockOffsetApplied, 0, 6, Integer)],
    },
    LabelDescriptor {
        label: "LEAP SECONDS",
        kind: TimeScoped,
        fields: &[field!(LeapSeconds, 0, 6, Integer)],
    },
    LabelDescriptor {
        label: "# OF SATELLITES",
        kind: Single(WarnAndReplace),
        fields: &[field!(Satellites, 0, 6, Integer)],
    },
    LabelDescriptor {
        label: "PRN / # OF OBS",
        kind: Single(Replace),
        fields: &[field!(ObservationCounts, 0, 60, ObservationCounts)],
    },
];

/// Header termination label
pub(crate) const END_OF_HEADER: &str = "END OF HEADER";

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, &'static LabelDescriptor> =
        LABELS.iter().map(|desc| (desc.label, desc)).collect();
}

/// Identifies a label (columns 60 to 80, trailing whitespace removed).
/// Labels that only differ by their whitespace are still identified,
/// in which case the second member is true.
pub(crate) fn lookup(label: &str) -> Option<(&'static LabelDescriptor, bool)> {
    if let Some(desc) = REGISTRY.get(label) {
        return Some((desc, false));
    }
    let compact: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    LABELS
        .iter()
        .find(|desc| {
            desc.label
                .chars()
                .filter(|c| !c.is_whitespace())
                .eq(compact.chars())
        })
        .map(|desc| (desc, true))
}

/// Identifies the header termination label, possibly fuzzily
pub(crate) fn is_end_of_header(label: &str) -> Option<bool> {
    if label == END_OF_HEADER {
        Some(false)
    } else if label
        .chars()
        .filter(|c| !c.is_whitespace())
        .eq(END_OF_HEADER.chars().filter(|c| !c.is_whitespace()))
    {
        Some(true)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn registry() {
        let (desc, fuzzy) = lookup("MARKER NAME").unwrap();
        assert_eq!(desc.label, "MARKER NAME");
        assert_eq!(desc.kind, FieldKind::TimeScoped);
        assert!(!fuzzy);

        let (desc, fuzzy) = lookup("CRINEX VERS / TYPE").unwrap();
        assert_eq!(desc.label, "CRINEX VERS   / TYPE");
        assert!(fuzzy);

        let (desc, fuzzy) = lookup("#/TYPES OF OBSERV").unwrap();
        assert_eq!(desc.fields[0].field, Field::Observables);
        assert!(fuzzy);

        assert!(lookup("SYS / # / OBS TYPES").is_none());

        let (desc, _) = lookup("TIME OF FIRST OBS").unwrap();
        assert_eq!(desc.kind, FieldKind::Single(RepeatPolicy::Forbidden));

        assert_eq!(is_end_of_header("END OF HEADER"), Some(false));
        assert_eq!(is_end_of_header("END  OF HEADER"), Some(true));
        assert_eq!(is_end_of_header("ENDOFHEADER"), Some(true));
        assert_eq!(is_end_of_header("COMMENT"), None);
    }
}
