//! Record filtering.
//!
//! Each record field gets its own [`Filter`]: an exact value, a list of
//! alternatives, an inversion, a predicate or an anchored regex. A
//! [`FilterSet`] combines one filter per field with AND logic.
//!
//! # Options
//!
//! ```text
//! de / dx                      regex, matched at the start of the callsign
//! band, mode, record_type      comma-separated list, leading ~ inverts
//! frequency, speed, snr        range expressions, see [`range`]
//! ```

pub mod matcher;
pub mod range;
pub mod set;

pub use matcher::{FieldText, Filter, Pattern, PredicateFn};
pub use range::{Range, RangeSyntaxError, compile_range, compile_ranges, range_filter};
pub use set::{FilterConfig, FilterError, FilterSet, INVERT_MARKER};
