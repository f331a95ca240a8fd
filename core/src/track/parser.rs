//! IGC flight-recorder decoding.
//!
//! Only two record types matter here: the `HFDTE` date header and `B` fix
//! records. Everything else in the file is skipped. Some older recorders
//! write the date header as `HTDFE`; it is read the same way.

use std::ops::Range;

use chrono::NaiveDate;

use crate::prelude::ParseError;
use crate::track::sample::{Sample, Track};

/// Shortest fix record carrying both altitude fields.
pub const MIN_FIX_LEN: usize = 35;

const DATE_MARKERS: [&[u8]; 2] = [b"HFDTE", b"HTDFE"];
const DATE_PREFIXES: [&[u8]; 2] = [b"DATE:", b"DATE"];
const FIX_MARKER: u8 = b'B';

const TIME: Range<usize> = 1..7;
const LAT_DEG: Range<usize> = 7..9;
const LAT_MIN: Range<usize> = 9..14;
const LAT_HEMI: usize = 14;
const LON_DEG: Range<usize> = 15..18;
const LON_MIN: Range<usize> = 18..23;
const LON_HEMI: usize = 23;
const ALT_GNSS: Range<usize> = 25..30;
const ALT_BARO: Range<usize> = 30..35;

/// Line-by-line decoder holding the current date context.
#[derive(Debug, Default)]
pub struct IgcParser {
    date: Option<NaiveDate>,
    samples: Vec<Sample>,
}

impl IgcParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one record. `line_no` is 1-based and only used in errors.
    pub fn feed_line(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let bytes = line.trim_end_matches('\r').as_bytes();
        if let Some(rest) = DATE_MARKERS
            .iter()
            .find_map(|marker| bytes.strip_prefix(*marker))
        {
            self.date = Some(parse_date_header(line_no, rest)?);
        } else if bytes.first() == Some(&FIX_MARKER) {
            let date = self.date.ok_or(ParseError::MissingDate { line: line_no })?;
            self.samples.push(parse_fix(line_no, bytes, date)?);
        }
        Ok(())
    }

    pub fn finish(self) -> Result<Track, ParseError> {
        Track::new(self.samples)
    }
}

/// Decodes a whole IGC document into a track.
pub fn parse_track(text: &str) -> Result<Track, ParseError> {
    let mut parser = IgcParser::new();
    for (idx, line) in text.lines().enumerate() {
        parser.feed_line(idx + 1, line)?;
    }
    parser.finish()
}

fn parse_date_header(line: usize, rest: &[u8]) -> Result<NaiveDate, ParseError> {
    let rest = DATE_PREFIXES
        .iter()
        .find_map(|prefix| rest.strip_prefix(*prefix))
        .unwrap_or(rest);
    if rest.len() < 6 {
        return Err(ParseError::InvalidDate {
            line,
            reason: "expected DDMMYY".into(),
        });
    }
    let field = |range: Range<usize>| {
        digits(&rest[range]).ok_or_else(|| ParseError::InvalidDate {
            line,
            reason: "non-digit in DDMMYY".into(),
        })
    };
    let day = field(0..2)?;
    let month = field(2..4)?;
    let year = 2000 + field(4..6)? as i32;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ParseError::InvalidDate {
        line,
        reason: format!("{:02}/{:02}/{} is not a calendar date", day, month, year),
    })
}

fn parse_fix(line: usize, bytes: &[u8], date: NaiveDate) -> Result<Sample, ParseError> {
    if bytes.len() < MIN_FIX_LEN {
        return Err(ParseError::TruncatedRecord {
            line,
            len: bytes.len(),
            min: MIN_FIX_LEN,
        });
    }
    let number = |range: Range<usize>, what: &str| {
        digits(&bytes[range]).ok_or_else(|| ParseError::malformed(line, format!("bad {}", what)))
    };

    let time = number(TIME, "time")?;
    let timestamp = date
        .and_hms_opt(time / 10_000, time / 100 % 100, time % 100)
        .ok_or_else(|| ParseError::malformed(line, format!("bad time of day {:06}", time)))?
        .and_utc()
        .timestamp();

    let mut latitude = number(LAT_DEG, "latitude")? as f64
        + number(LAT_MIN, "latitude minutes")? as f64 / 1000.0 / 60.0;
    match bytes[LAT_HEMI] {
        b'N' => {}
        b'S' => latitude = -latitude,
        other => {
            return Err(ParseError::malformed(
                line,
                format!("latitude hemisphere '{}'", other as char),
            ))
        }
    }

    let mut longitude = number(LON_DEG, "longitude")? as f64
        + number(LON_MIN, "longitude minutes")? as f64 / 1000.0 / 60.0;
    match bytes[LON_HEMI] {
        b'E' => {}
        b'W' => longitude = -longitude,
        other => {
            return Err(ParseError::malformed(
                line,
                format!("longitude hemisphere '{}'", other as char),
            ))
        }
    }

    let altitude = |range: Range<usize>, what: &str| {
        std::str::from_utf8(&bytes[range])
            .ok()
            .and_then(|field| field.parse::<i32>().ok())
            .ok_or_else(|| ParseError::malformed(line, format!("bad {} altitude", what)))
    };
    let altitude_gnss = altitude(ALT_GNSS, "GNSS")?;
    let altitude_baro = altitude(ALT_BARO, "pressure")?;

    Ok(Sample::new(
        timestamp,
        latitude,
        longitude,
        altitude_gnss,
        altitude_baro,
    ))
}

fn digits(field: &[u8]) -> Option<u32> {
    field.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + (b - b'0') as u32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const HEADER: &str = "HFDTE150722";

    #[test]
    fn fix_record_decodes_coordinates_and_altitudes() {
        let track = parse_track(&format!(
            "{}\nB1012305017000N00045000WA0015000150\nB1012315017100N00045100WA0015200149\n",
            HEADER
        ))
        .unwrap();
        let first = track.samples()[0];
        assert_abs_diff_eq!(first.latitude, 50.0 + 17.0 / 60.0, epsilon = 1e-12);
        assert_abs_diff_eq!(first.longitude, -0.75, epsilon = 1e-12);
        assert_eq!(first.altitude_gnss, 150);
        assert_eq!(first.altitude_baro, 150);

        let expected = NaiveDate::from_ymd_opt(2022, 7, 15)
            .unwrap()
            .and_hms_opt(10, 12, 30)
            .unwrap()
            .and_utc()
            .timestamp();
        assert_eq!(first.timestamp, expected);

        let second = track.samples()[1];
        assert_eq!(second.timestamp, expected + 1);
        assert_eq!(second.altitude_gnss, 152);
        assert_eq!(second.altitude_baro, 149);
    }

    #[test]
    fn southern_and_eastern_hemispheres() {
        let track = parse_track(&format!(
            "{}\nB0000003330500S15112250EA0001000020\nB0000013330500S15112250EA0001000020",
            HEADER
        ))
        .unwrap();
        let fix = track.samples()[0];
        assert_abs_diff_eq!(fix.latitude, -(33.0 + 30.5 / 60.0), epsilon = 1e-12);
        assert_abs_diff_eq!(fix.longitude, 151.0 + 12.25 / 60.0, epsilon = 1e-12);
    }

    #[test]
    fn long_date_header_layout() {
        let track = parse_track(
            "HFDTEDATE:010323,01\nB0000004500000N00600000EA0100001000\nB0000014500000N00600000EA0100001000",
        )
        .unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();
        assert_eq!(track.samples()[0].timestamp, expected);
    }

    #[test]
    fn transposed_date_marker_is_read() {
        for header in ["HTDFEDATE010323", "HTDFE010323"] {
            let track = parse_track(&format!(
                "{}\nB0000004500000N00600000EA0100001000\nB0000014500000N00600000EA0100001000",
                header
            ))
            .unwrap();
            let expected = NaiveDate::from_ymd_opt(2023, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc()
                .timestamp();
            assert_eq!(track.samples()[0].timestamp, expected, "{}", header);
        }
    }

    #[test]
    fn truncated_fix_is_rejected() {
        let err = parse_track(&format!("{}\nB1012305017000N00045000WA00150", HEADER)).unwrap_err();
        assert_eq!(
            err,
            ParseError::TruncatedRecord {
                line: 2,
                len: 30,
                min: MIN_FIX_LEN
            }
        );
    }

    #[test]
    fn unknown_hemisphere_is_malformed() {
        let err =
            parse_track(&format!("{}\nB1012305017000N000450000A0015000150", HEADER)).unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { line: 2, .. }));

        let err =
            parse_track(&format!("{}\nB1012305017000X00045000WA0015000150", HEADER)).unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn fix_before_date_header_fails() {
        let err = parse_track("B1012305017000N00045000WA0015000150").unwrap_err();
        assert_eq!(err, ParseError::MissingDate { line: 1 });
    }

    #[test]
    fn malformed_date_header_fails_the_track() {
        let err = parse_track("HFDTE310222\nB1012305017000N00045000WA0015000150").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { line: 1, .. }));

        let err = parse_track("HFDTE15A722").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { line: 1, .. }));
    }

    #[test]
    fn other_records_are_ignored_and_duplicates_kept() {
        let text = format!(
            "AXXX001\r\n{}\r\nLXXX comment\r\nB1012305017000N00045000WA0015000150\r\nB1012305017000N00045000WA0015000150\r\nG123\r\n",
            HEADER
        );
        let track = parse_track(&text).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.samples()[0], track.samples()[1]);
        assert_eq!(track.mean_time_delta(), 0.0);
    }

    #[test]
    fn negative_altitude_is_accepted() {
        let track = parse_track(&format!(
            "{}\nB1012305017000N00045000WA-0012-0015\nB1012315017000N00045000WA0001000005",
            HEADER
        ))
        .unwrap();
        assert_eq!(track.samples()[0].altitude_gnss, -12);
        assert_eq!(track.samples()[0].altitude_baro, -15);
    }
}
