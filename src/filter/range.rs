//! Numeric range expressions.
//!
//! ```text
//! <=X  >=X  /=X  =X  <X  >X  X-Y
//! ```
//!
//! `X` and `Y` are decimal floating-point literals: an optional sign, digits
//! with an optional fraction (`5`, `5.`, `.5`, `7018.3`) and an optional
//! exponent (`1e3`, `2.5E-1`). `inf` and `NaN` are not accepted.
//!
//! A comma-separated list of expressions matches when any one of them does.
//! Two-character operators are tried before their one-character prefixes.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, one_of, space0},
    combinator::{all_consuming, map, map_res, opt, recognize},
    sequence::{delimited, preceded, separated_pair},
};
use thiserror::Error;

use super::matcher::Filter;

/// A range expression that failed to compile.
#[derive(Debug, Error, PartialEq)]
#[error("Invalid range expression: '{0}'")]
pub struct RangeSyntaxError(pub String);

/// A single compiled range expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Range {
    AtMost(f64),
    AtLeast(f64),
    NotEqual(f64),
    Equal(f64),
    Below(f64),
    Above(f64),
    /// Inclusive at both ends. `lo <= hi` is not enforced.
    Between(f64, f64),
}

impl Range {
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Range::AtMost(x) => value <= x,
            Range::AtLeast(x) => value >= x,
            Range::NotEqual(x) => value != x,
            Range::Equal(x) => value == x,
            Range::Below(x) => value < x,
            Range::Above(x) => value > x,
            Range::Between(lo, hi) => lo <= value && value <= hi,
        }
    }
}

/// The text of a float literal, without padding.
fn float_literal(input: &str) -> IResult<&str, &str> {
    recognize((
        opt(one_of("+-")),
        alt((
            recognize((digit1, opt((char('.'), digit0)))),
            recognize((char('.'), digit1)),
        )),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

/// A float literal, optionally padded with spaces or tabs.
fn number(input: &str) -> IResult<&str, f64> {
    delimited(space0, map_res(float_literal, |s: &str| s.parse::<f64>()), space0).parse(input)
}

fn operator<'a>(
    op: &'static str,
    build: fn(f64) -> Range,
) -> impl Parser<&'a str, Output = Range, Error = nom::error::Error<&'a str>> {
    map(preceded(tag(op), number), build)
}

fn range(input: &str) -> IResult<&str, Range> {
    alt((
        operator("<=", Range::AtMost),
        operator(">=", Range::AtLeast),
        operator("/=", Range::NotEqual),
        operator("=", Range::Equal),
        operator("<", Range::Below),
        operator(">", Range::Above),
        map(separated_pair(number, char('-'), number), |(lo, hi): (f64, f64)| {
            Range::Between(lo, hi)
        }),
    ))
    .parse(input)
}

/// Compile one range expression.
///
/// ```
/// use rbn_filter::filter::compile_range;
///
/// let range = compile_range("5-10").unwrap();
/// assert!(range.contains(5.0));
/// assert!(range.contains(10.0));
/// assert!(!range.contains(10.001));
/// ```
pub fn compile_range(text: &str) -> Result<Range, RangeSyntaxError> {
    all_consuming(range)
        .parse(text.trim())
        .map(|(_, range)| range)
        .map_err(|_| RangeSyntaxError(text.to_string()))
}

/// Compile a comma-separated list of range expressions.
pub fn compile_ranges(text: &str) -> Result<Vec<Range>, RangeSyntaxError> {
    text.split(',').map(compile_range).collect()
}

/// Compile a range list into a filter over any value with a numeric view.
///
/// Each expression becomes a predicate; the list is an [`Filter::AnyOf`].
pub fn range_filter<V: 'static>(
    text: &str,
    numeric: fn(&V) -> f64,
) -> Result<Filter<V>, RangeSyntaxError> {
    let ranges = compile_ranges(text)?;
    Ok(Filter::any_of(ranges.into_iter().map(|range| {
        Filter::predicate(move |value: &V| range.contains(numeric(value)))
    })))
}
