//! Packed date parsing, as found in headers and epoch lines
use crate::{
    columns,
    gnss_time::{Error as TimeError, TimePoint, TimeSystem},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("failed to parse years from \"{0}\"")]
    YearField(String),
    #[error("failed to parse months from \"{0}\"")]
    MonthField(String),
    #[error("failed to parse days from \"{0}\"")]
    DayField(String),
    #[error("failed to parse hours from \"{0}\"")]
    HoursField(String),
    #[error("failed to parse minutes field from \"{0}\"")]
    MinutesField(String),
    #[error("failed to parse seconds field from \"{0}\"")]
    SecondsField(String),
    #[error("invalid date")]
    Calendar(#[from] TimeError),
}

/// Column layout of a packed date
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Layout {
    /// TIME OF FIRST / LAST OBS: 6 wide fields, 4 digit years
    /// and 13 wide seconds
    Header,
    /// Epoch lines: 3 wide fields, 2 digit years and 11 wide seconds
    Record,
}

impl Layout {
    fn widths(&self) -> (usize, usize) {
        match self {
            Self::Header => (6, 13),
            Self::Record => (3, 11),
        }
    }
}

/*
 * Blank integer fields are null
 */
fn integer<T: std::str::FromStr + Default>(content: &str) -> Result<T, ()> {
    let content = content.trim();
    if content.is_empty() {
        Ok(T::default())
    } else {
        content.parse::<T>().map_err(|_| ())
    }
}

/// Completes a 2 digit year: the completion closest to `base_year`
/// when known (so files may cross a century boundary),
/// otherwise 80-99 are 19XX and 00-79 are 20XX.
pub fn expand_year(year: i32, base_year: Option<i32>) -> i32 {
    match base_year {
        Some(base) => {
            let century = year + (base / 100) * 100;
            [century + 100, century - 100]
                .into_iter()
                .fold(century, |best, candidate| {
                    if (candidate - base).abs() < (best - base).abs() {
                        candidate
                    } else {
                        best
                    }
                })
        },
        None if year < 80 => year + 2000,
        None => year + 1900,
    }
}

/// Parses a packed date, with given [Layout].
/// Returns None when the date is blank. The instant is attached
/// to `system`, or naive when `system` is None.
pub fn parse_epoch(
    content: &str,
    layout: Layout,
    base_year: Option<i32>,
    system: Option<TimeSystem>,
) -> Result<Option<TimePoint>, ParsingError> {
    let (width, sec_width) = layout.widths();
    let content = columns(content, 0, width * 5 + sec_width);
    if content.trim().is_empty() {
        return Ok(None);
    }

    let field = |i: usize| columns(content, width * i, width * (i + 1));

    let mut y = integer::<i32>(field(0)).map_err(|_| ParsingError::YearField(field(0).to_string()))?;
    if layout == Layout::Record {
        y = expand_year(y, base_year);
    }

    let m = integer::<u8>(field(1)).map_err(|_| ParsingError::MonthField(field(1).to_string()))?;
    let d = integer::<u8>(field(2)).map_err(|_| ParsingError::DayField(field(2).to_string()))?;
    let hh = integer::<u8>(field(3)).map_err(|_| ParsingError::HoursField(field(3).to_string()))?;
    let mm =
        integer::<u8>(field(4)).map_err(|_| ParsingError::MinutesField(field(4).to_string()))?;

    let seconds = columns(content, width * 5, width * 5 + sec_width);
    let ss = integer::<f64>(seconds).map_err(|_| ParsingError::SecondsField(seconds.to_string()))?;

    let t = TimePoint::from_fractional_seconds(y, m, d, hh, mm, ss, system)?;
    Ok(Some(t))
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn header_layout() {
        let t = parse_epoch(
            "  2021     1     1     0     0   30.0000000     GPS",
            Layout::Header,
            None,
            Some(TimeSystem::GPS),
        )
        .unwrap()
        .unwrap();
        assert_eq!(t.to_gregorian(), (2021, 1, 1, 0, 0, 30, 0));
        assert_eq!(t.system(), Some(TimeSystem::GPS));
    }
    #[test]
    fn record_layout() {
        let t = parse_epoch(" 21  1  1  0  0 30.1234560  0  2G01G02", Layout::Record, None, None)
            .unwrap()
            .unwrap();
        assert_eq!(t.to_gregorian(), (2021, 1, 1, 0, 0, 30, 123456));
        assert!(t.is_naive());

        let t = parse_epoch(" 97  3 18  0  0  0.0000000  0", Layout::Record, None, None)
            .unwrap()
            .unwrap();
        assert_eq!(t.year(), 1997);

        let t = parse_epoch(" 97  3 18  0  0  0.0000000  0", Layout::Record, Some(2097), None)
            .unwrap()
            .unwrap();
        assert_eq!(t.year(), 2097);
    }
    #[test]
    fn blank_and_faulty() {
        assert!(matches!(parse_epoch("      ", Layout::Record, None, None), Ok(None)));
        assert!(matches!(parse_epoch("", Layout::Header, None, None), Ok(None)));
        assert!(matches!(
            parse_epoch(" 21 xx  1  0  0 30.0000000", Layout::Record, None, None),
            Err(ParsingError::MonthField(_))
        ));
        assert!(matches!(
            parse_epoch(" 21 13  1  0  0 30.0000000", Layout::Record, None, None),
            Err(ParsingError::Calendar(_))
        ));
    }
    #[test]
    fn two_digit_years() {
        assert_eq!(expand_year(79, None), 2079);
        assert_eq!(expand_year(80, None), 1980);
        assert_eq!(expand_year(5, Some(2005)), 2005);
        assert_eq!(expand_year(99, Some(1999)), 1999);
    }
    #[test]
    fn century_crossing() {
        assert_eq!(expand_year(0, Some(1999)), 2000);
        assert_eq!(expand_year(1, Some(1999)), 2001);
        assert_eq!(expand_year(99, Some(2000)), 1999);
        assert_eq!(expand_year(98, Some(2001)), 1998);
        assert_eq!(expand_year(50, Some(2000)), 2050);

        let t = parse_epoch(" 00  1  1  0  0  0.0000000  0", Layout::Record, Some(1999), None)
            .unwrap()
            .unwrap();
        assert_eq!(t.year(), 2000);
    }
}
