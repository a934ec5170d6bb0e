//! The read-parse-filter step applied to every incoming line.

use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

use crate::filter::FilterSet;
use crate::parser::{looks_like_spot, parse_record};
use crate::record::Record;

/// Counters for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Lines read from the feed.
    pub lines: u64,

    /// Banner, prompt and blank lines.
    pub non_spot_lines: u64,

    /// Lines that looked like spots but failed the grammar.
    pub parse_failures: u64,

    /// Successfully parsed spots.
    pub spots: u64,

    /// Spots that passed the filters.
    pub matched: u64,
}

impl fmt::Display for FeedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines, {} spots ({} matched), {} parse failures, {} non-spot lines",
            self.lines, self.spots, self.matched, self.parse_failures, self.non_spot_lines
        )
    }
}

/// Process a single line from the feed.
///
/// Returns the record if it parsed and passed `filters`. Lines that fail to
/// parse are dropped; they only show up in the counters and debug logs.
pub fn process_line(line: &str, filters: &FilterSet, stats: &mut FeedStats) -> Option<Record> {
    stats.lines += 1;

    if !looks_like_spot(line) {
        stats.non_spot_lines += 1;
        trace!("Non-spot line: {}", line);
        return None;
    }

    let record = match parse_record(line) {
        Ok(record) => record,
        Err(e) => {
            stats.parse_failures += 1;
            debug!("Parse error for '{}': {}", line, e);
            return None;
        }
    };
    stats.spots += 1;

    if !filters.matches(&record) {
        return None;
    }
    stats.matched += 1;
    Some(record)
}

/// Filter an in-memory sequence of lines, preserving input order.
pub fn filter_lines<'l>(
    lines: impl IntoIterator<Item = &'l str>,
    filters: &FilterSet,
    stats: &mut FeedStats,
) -> Vec<Record> {
    lines
        .into_iter()
        .filter_map(|line| process_line(line, filters, stats))
        .collect()
}
