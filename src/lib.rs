//! RBN Filter - stream spots from the Reverse Beacon Network and keep only
//! the ones you care about.
//!
//! This crate provides:
//! - A strict nom-based parser for RBN spot lines
//! - Band classification from a data-driven band table
//! - Composable per-field filters, including a small range language
//! - An async telnet client for streaming spot lines
//!
//! # Example
//!
//! ```rust
//! use rbn_filter::{FilterConfig, FilterSet, parse_record};
//!
//! let filters = FilterSet::from_config(&FilterConfig {
//!     band: Some("20".to_string()),
//!     signal_strength: Some(">=10".to_string()),
//!     ..Default::default()
//! })
//! .expect("valid filters");
//!
//! let line = "DX de EA5WU-#:    14025.0  RW1M           CW    19 dB  18 WPM  CQ      2259Z";
//! let record = parse_record(line).expect("Failed to parse spot");
//!
//! assert!(filters.matches(&record));
//! ```

pub mod band;
pub mod client;
pub mod config;
pub mod feed;
pub mod filter;
pub mod parser;
pub mod record;

pub use band::{Band, BandTable, BandTableError};
pub use client::{RbnClient, RbnClientConfig, SpotFeed};
pub use config::Config;
pub use feed::{FeedStats, filter_lines, process_line};
pub use filter::{Filter, FilterConfig, FilterError, FilterSet, RangeSyntaxError, compile_range};
pub use parser::{ParseError, looks_like_spot, parse_record};
pub use record::{Record, Speed};
