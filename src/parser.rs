//! Parser for RBN (Reverse Beacon Network) spot lines.
//!
//! This module uses the `nom` parsing library. The grammar is strict: a line
//! either matches in full or is rejected, there is no partial parse.
//!
//! # Spot Format
//!
//! ```text
//! DX de SKIMMER:  FREQ  CALLSIGN  MODE  SNR dB  SPEED UNIT  TYPE  HHMMZ
//! ```
//!
//! Example:
//! ```text
//! DX de EA5WU-#:    7018.3  RW1M           CW    19 dB  18 WPM  CQ      2259Z
//! ```

use chrono::NaiveTime;
use nom::{
    IResult, Parser,
    bytes::complete::{tag, take_while_m_n, take_while1},
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    error::{Error as NomError, ErrorKind},
    sequence::terminated,
};
use thiserror::Error;

use crate::record::{Record, Speed};

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid spot format: {0}")]
    InvalidFormat(String),

    #[error("Empty line")]
    Empty,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Field separator: one or more spaces or tabs.
fn sep(input: &str) -> IResult<&str, &str> {
    space1(input)
}

/// Optional padding.
fn pad(input: &str) -> IResult<&str, &str> {
    space0(input)
}

/// Any run of non-whitespace characters.
fn token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace()).parse(input)
}

/// Parse the literal "DX de " prefix that starts every spot line.
///
/// Matches exactly what [`looks_like_spot`] checks for, so no line passes
/// the parser while failing the pre-filter.
fn parse_prefix(input: &str) -> IResult<&str, ()> {
    value((), (tag("DX de "), pad)).parse(input)
}

/// Parse the skimmer identifier followed by a colon.
fn parse_skimmer(input: &str) -> IResult<&str, &str> {
    terminated(
        take_while1(|c: char| c != ':' && !c.is_whitespace()),
        char(':'),
    )
    .parse(input)
}

/// Parse a decimal frequency in kHz. The fractional part is mandatory.
fn parse_frequency(input: &str) -> IResult<&str, f64> {
    map_res(recognize((digit1, char('.'), digit1)), |s: &str| {
        s.parse::<f64>()
    })
    .parse(input)
}

/// Parse the signal strength (e.g., "19 dB" or "-5 dB").
fn parse_signal_strength(input: &str) -> IResult<&str, i32> {
    terminated(
        map_res(recognize((opt(char('-')), digit1)), |s: &str| {
            s.parse::<i32>()
        }),
        (sep, tag("dB")),
    )
    .parse(input)
}

/// Parse the speed value and its unit token (e.g., "18 WPM").
fn parse_speed(input: &str) -> IResult<&str, Speed> {
    map(
        (map_res(digit1, |s: &str| s.parse::<u32>()), sep, token),
        |(value, _, unit): (u32, &str, &str)| Speed {
            value,
            unit: unit.to_string(),
        },
    )
    .parse(input)
}

/// Parse a 4-digit zulu group like "2259Z".
fn parse_zulu(input: &str) -> IResult<&str, NaiveTime> {
    map_res(
        terminated(take_while_m_n(4, 4, |c: char| c.is_ascii_digit()), char('Z')),
        |s: &str| {
            let hour: u32 = s[0..2].parse().map_err(|_| "Invalid hour")?;
            let min: u32 = s[2..4].parse().map_err(|_| "Invalid minute")?;
            NaiveTime::from_hms_opt(hour, min, 0).ok_or("Invalid time values")
        },
    )
    .parse(input)
}

/// Parse the record type and the trailing zulu group.
///
/// The record type may contain inner whitespace (`NCDXF B`), so it spans
/// everything up to the last separator. The input is already trimmed.
fn parse_type_and_time(input: &str) -> IResult<&str, (&str, NaiveTime)> {
    let split = input
        .rfind([' ', '\t'])
        .ok_or_else(|| nom::Err::Error(NomError::new(input, ErrorKind::Space)))?;

    let record_type = input[..split].trim_end_matches([' ', '\t']);
    if record_type.is_empty() {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::TakeWhile1)));
    }

    let (rest, time) = all_consuming(parse_zulu).parse(&input[split + 1..])?;
    Ok((rest, (record_type, time)))
}

fn parse_line(input: &str) -> IResult<&str, Record> {
    let (input, _) = parse_prefix(input)?;
    let (input, station_dx) = parse_skimmer(input)?;
    let (input, _) = pad(input)?;
    let (input, frequency) = parse_frequency(input)?;
    let (input, _) = sep(input)?;
    let (input, station_de) = token(input)?;
    let (input, _) = sep(input)?;
    let (input, mode) = token(input)?;
    let (input, _) = sep(input)?;
    let (input, signal_strength) = parse_signal_strength(input)?;
    let (input, _) = sep(input)?;
    let (input, speed) = parse_speed(input)?;
    let (input, _) = sep(input)?;
    let (input, (record_type, time)) = parse_type_and_time(input)?;

    Ok((
        input,
        Record {
            station_dx: station_dx.to_string(),
            frequency,
            station_de: station_de.to_string(),
            mode: mode.to_string(),
            signal_strength,
            speed,
            record_type: record_type.to_string(),
            time,
        },
    ))
}

/// Parse a complete RBN spot line.
///
/// Leading and trailing whitespace (including the `\r\n` terminator) is
/// ignored. Anything else that deviates from the grammar is an error.
///
/// # Example
///
/// ```
/// use rbn_filter::parser::parse_record;
///
/// let line = "DX de EA5WU-#:    7018.3  RW1M           CW    19 dB  18 WPM  CQ      2259Z";
/// let record = parse_record(line).unwrap();
/// assert_eq!(record.station_dx, "EA5WU-#");
/// assert_eq!(record.station_de, "RW1M");
/// ```
pub fn parse_record(line: &str) -> ParseResult<Record> {
    let input = line.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    match parse_line(input) {
        Ok((_, record)) => Ok(record),
        Err(e) => Err(ParseError::InvalidFormat(format!("{:?}", e))),
    }
}

/// Check if a line looks like a spot (quick pre-filter).
///
/// Lines failing this check are banner or prompt text rather than damaged
/// spots.
#[inline]
pub fn looks_like_spot(line: &str) -> bool {
    line.trim_start().starts_with("DX de ")
}
