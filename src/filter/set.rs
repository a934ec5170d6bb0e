//! Per-record filter sets.
//!
//! A [`FilterConfig`] holds the textual filter options as given on the
//! command line or in the config file. [`FilterSet::from_config`] compiles
//! them once at start-up; any error there is fatal before connecting.

use serde::Deserialize;
use thiserror::Error;

use super::matcher::Filter;
use super::range::{RangeSyntaxError, range_filter};
use crate::band::{Band, BandTable, BandTableError};
use crate::record::{Record, Speed};

/// Leading marker that inverts a list filter (`~20,40`).
pub const INVERT_MARKER: char = '~';

/// Errors from compiling filter options.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid {field} pattern: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid {field} filter: {source}")]
    InvalidRange {
        field: &'static str,
        #[source]
        source: RangeSyntaxError,
    },

    #[error("Invalid band filter: {0}")]
    InvalidBand(#[from] BandTableError),

    #[error("Empty entry in {0} filter")]
    EmptyEntry(&'static str),
}

/// Textual filter options. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Transmitting station regex (anchored at the start).
    pub de: Option<String>,

    /// Skimmer regex (anchored at the start).
    pub dx: Option<String>,

    /// Comma-separated bands, e.g. `20,40` or `~160`.
    pub band: Option<String>,

    /// Comma-separated modes, e.g. `CW,RTTY`.
    pub mode: Option<String>,

    /// Comma-separated record types, e.g. `CQ` or `~BEACON,NCDXF B`.
    pub record_type: Option<String>,

    /// Range expressions over the frequency in kHz.
    pub frequency: Option<String>,

    /// Range expressions over the speed value.
    pub speed: Option<String>,

    /// Range expressions over the signal strength in dB.
    pub signal_strength: Option<String>,
}

impl FilterConfig {
    /// Overlay `other` on top of `self`, field by field.
    pub fn merge(self, other: FilterConfig) -> FilterConfig {
        FilterConfig {
            de: other.de.or(self.de),
            dx: other.dx.or(self.dx),
            band: other.band.or(self.band),
            mode: other.mode.or(self.mode),
            record_type: other.record_type.or(self.record_type),
            frequency: other.frequency.or(self.frequency),
            speed: other.speed.or(self.speed),
            signal_strength: other.signal_strength.or(self.signal_strength),
        }
    }
}

/// Compiled filters, one per record field.
///
/// A record matches when every filter passes; [`Filter::Any`] fields
/// accept everything. The band filter classifies frequencies with
/// `bands`, which is the standard table unless replaced through
/// [`FilterSet::with_band_table`].
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub bands: BandTable,
    pub dx: Filter<String>,
    pub de: Filter<String>,
    pub band: Filter<Option<Band>>,
    pub frequency: Filter<f64>,
    pub mode: Filter<String>,
    pub signal_strength: Filter<i32>,
    pub speed: Filter<Speed>,
    pub record_type: Filter<String>,
}

/// Split `~a,b,c` into the inversion flag and trimmed entries.
fn split_list<'a>(
    text: &'a str,
    field: &'static str,
) -> Result<(bool, Vec<&'a str>), FilterError> {
    let text = text.trim();
    let (invert, body) = match text.strip_prefix(INVERT_MARKER) {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let entries = body
        .split(',')
        .map(str::trim)
        .map(|entry| {
            if entry.is_empty() {
                Err(FilterError::EmptyEntry(field))
            } else {
                Ok(entry)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((invert, entries))
}

fn string_list(text: &str, field: &'static str) -> Result<Filter<String>, FilterError> {
    let (invert, entries) = split_list(text, field)?;
    Ok(Filter::one_of(entries.into_iter().map(str::to_string)).inverted(invert))
}

fn pattern(text: &str, field: &'static str) -> Result<Filter<String>, FilterError> {
    Filter::pattern(text).map_err(|source| FilterError::InvalidPattern { field, source })
}

fn ranges<V: 'static>(
    text: &str,
    field: &'static str,
    numeric: fn(&V) -> f64,
) -> Result<Filter<V>, FilterError> {
    range_filter(text, numeric).map_err(|source| FilterError::InvalidRange { field, source })
}

impl FilterSet {
    /// Compile every configured option.
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        let mut set = FilterSet::default();

        if let Some(ref de) = config.de {
            set.de = pattern(de, "de")?;
        }
        if let Some(ref dx) = config.dx {
            set.dx = pattern(dx, "dx")?;
        }
        if let Some(ref band) = config.band {
            let (invert, entries) = split_list(band, "band")?;
            let bands = entries
                .into_iter()
                .map(|entry| entry.parse::<Band>().map(Some))
                .collect::<Result<Vec<_>, _>>()?;
            set.band = Filter::one_of(bands).inverted(invert);
        }
        if let Some(ref mode) = config.mode {
            set.mode = string_list(mode, "mode")?;
        }
        if let Some(ref record_type) = config.record_type {
            set.record_type = string_list(record_type, "record type")?;
        }
        if let Some(ref frequency) = config.frequency {
            set.frequency = ranges(frequency, "frequency", |v: &f64| *v)?;
        }
        if let Some(ref speed) = config.speed {
            set.speed = ranges(speed, "speed", |s: &Speed| s.value as f64)?;
        }
        if let Some(ref snr) = config.signal_strength {
            set.signal_strength = ranges(snr, "signal strength", |v: &i32| *v as f64)?;
        }

        Ok(set)
    }

    /// Classify bands with `table` instead of the standard table.
    pub fn with_band_table(mut self, table: BandTable) -> Self {
        self.bands = table;
        self
    }

    /// Check if a record passes every filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.dx.matches(&record.station_dx)
            && self.de.matches(&record.station_de)
            && self.band.matches(&record.band_in(&self.bands))
            && self.frequency.matches(&record.frequency)
            && self.mode.matches(&record.mode)
            && self.signal_strength.matches(&record.signal_strength)
            && self.speed.matches(&record.speed)
            && self.record_type.matches(&record.record_type)
    }

    /// True when no field is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.dx.is_any()
            && self.de.is_any()
            && self.band.is_any()
            && self.frequency.is_any()
            && self.mode.is_any()
            && self.signal_strength.is_any()
            && self.speed.is_any()
            && self.record_type.is_any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn make_record(dx: &str, de: &str, freq: f64, snr: i32, wpm: u32) -> Record {
        Record {
            station_dx: dx.to_string(),
            frequency: freq,
            station_de: de.to_string(),
            mode: "CW".to_string(),
            signal_strength: snr,
            speed: Speed {
                value: wpm,
                unit: "WPM".to_string(),
            },
            record_type: "CQ".to_string(),
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        }
    }

    fn compile(config: FilterConfig) -> FilterSet {
        FilterSet::from_config(&config).unwrap()
    }

    #[test]
    fn test_custom_band_table() {
        let config = FilterConfig {
            band: Some("20".to_string()),
            ..Default::default()
        };
        let wide = BandTable::new(vec![(Band(40.0), 7_300.0), (Band(20.0), 20_000.0)]).unwrap();
        let set = compile(config.clone()).with_band_table(wide);

        // 18100 kHz is 17m in the standard table but 20m in this one.
        let record = make_record("EA5WU-#", "W6JSV", 18_100.0, 15, 20);
        assert!(set.matches(&record));
        assert!(!compile(config).matches(&record));
    }

    #[test]
    fn test_empty_set_matches_everything() {
        let set = compile(FilterConfig::default());
        assert!(set.is_unconstrained());
        assert!(set.matches(&make_record("EA5WU-#", "W6JSV", 14025.0, 15, 20)));
        assert!(set.matches(&make_record("EA5WU-#", "W6JSV", 9_000_000.0, 15, 20)));
    }

    #[test]
    fn test_de_and_dx_patterns_are_prefix_matches() {
        let set = compile(FilterConfig {
            de: Some("W6".to_string()),
            dx: Some("EA".to_string()),
            ..Default::default()
        });

        assert!(set.matches(&make_record("EA5WU-#", "W6JSV", 14025.0, 15, 20)));
        assert!(!set.matches(&make_record("EA5WU-#", "KW6ABC", 14025.0, 15, 20)));
        assert!(!set.matches(&make_record("VE7CC-#", "W6JSV", 14025.0, 15, 20)));
    }

    #[test]
    fn test_band_list() {
        let set = compile(FilterConfig {
            band: Some("20,40".to_string()),
            ..Default::default()
        });

        assert!(set.matches(&make_record("S-#", "W6JSV", 14025.0, 15, 20)));
        assert!(set.matches(&make_record("S-#", "W6JSV", 7025.0, 15, 20)));
        assert!(!set.matches(&make_record("S-#", "W6JSV", 21025.0, 15, 20)));
        // No band at all never equals a listed band.
        assert!(!set.matches(&make_record("S-#", "W6JSV", 9_000_000.0, 15, 20)));
    }

    #[test]
    fn test_inverted_band_list() {
        let set = compile(FilterConfig {
            band: Some("~20".to_string()),
            ..Default::default()
        });

        assert!(!set.matches(&make_record("S-#", "W6JSV", 14025.0, 15, 20)));
        assert!(set.matches(&make_record("S-#", "W6JSV", 7025.0, 15, 20)));
        assert!(set.matches(&make_record("S-#", "W6JSV", 9_000_000.0, 15, 20)));
    }

    #[test]
    fn test_band_units() {
        let set = compile(FilterConfig {
            band: Some("70cm, 1.25m".to_string()),
            ..Default::default()
        });

        assert!(set.matches(&make_record("S-#", "W6JSV", 432_100.0, 15, 20)));
        assert!(set.matches(&make_record("S-#", "W6JSV", 222_100.0, 15, 20)));
        assert!(!set.matches(&make_record("S-#", "W6JSV", 144_100.0, 15, 20)));
    }

    #[test]
    fn test_mode_and_record_type_lists() {
        let set = compile(FilterConfig {
            mode: Some("RTTY,CW".to_string()),
            record_type: Some("~BEACON,NCDXF B".to_string()),
            ..Default::default()
        });

        let cq = make_record("S-#", "W6JSV", 14025.0, 15, 20);
        assert!(set.matches(&cq));

        let beacon = Record {
            record_type: "NCDXF B".to_string(),
            ..cq.clone()
        };
        assert!(!set.matches(&beacon));

        let ft8 = Record {
            mode: "FT8".to_string(),
            ..cq
        };
        assert!(!set.matches(&ft8));
    }

    #[test]
    fn test_range_filters() {
        let set = compile(FilterConfig {
            frequency: Some("14000-14070".to_string()),
            speed: Some("<=25,>=40".to_string()),
            signal_strength: Some(">=10".to_string()),
            ..Default::default()
        });

        assert!(set.matches(&make_record("S-#", "W6JSV", 14025.0, 15, 20)));
        assert!(set.matches(&make_record("S-#", "W6JSV", 14070.0, 10, 45)));
        assert!(!set.matches(&make_record("S-#", "W6JSV", 14025.0, 15, 30)));
        assert!(!set.matches(&make_record("S-#", "W6JSV", 14025.0, 9, 20)));
        assert!(!set.matches(&make_record("S-#", "W6JSV", 14080.0, 15, 20)));
    }

    #[test]
    fn test_combined_and_logic() {
        let set = compile(FilterConfig {
            band: Some("20".to_string()),
            signal_strength: Some(">=15".to_string()),
            ..Default::default()
        });

        assert!(set.matches(&make_record("S-#", "W6JSV", 14025.0, 20, 20)));
        assert!(!set.matches(&make_record("S-#", "W6JSV", 14025.0, 10, 20)));
        assert!(!set.matches(&make_record("S-#", "W6JSV", 7025.0, 20, 20)));
    }

    #[test]
    fn test_configuration_errors_fail_fast() {
        let bad = [
            FilterConfig {
                band: Some("20,forty".to_string()),
                ..Default::default()
            },
            FilterConfig {
                band: Some("20,,40".to_string()),
                ..Default::default()
            },
            FilterConfig {
                de: Some("W6(".to_string()),
                ..Default::default()
            },
            FilterConfig {
                speed: Some("fast".to_string()),
                ..Default::default()
            },
            FilterConfig {
                mode: Some("~".to_string()),
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(FilterSet::from_config(&config).is_err(), "{:?}", config);
        }
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = FilterSet::from_config(&FilterConfig {
            signal_strength: Some("loud".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid signal strength filter: Invalid range expression: 'loud'"
        );
    }

    #[test]
    fn test_parse_from_toml() {
        let config: FilterConfig = toml::from_str(
            r#"
            de = "W6"
            band = "~20,40"
            speed = "20-30"
        "#,
        )
        .unwrap();
        assert_eq!(config.de.as_deref(), Some("W6"));
        assert_eq!(config.band.as_deref(), Some("~20,40"));
        assert!(config.mode.is_none());
        assert!(FilterSet::from_config(&config).is_ok());
    }

    #[test]
    fn test_merge_prefers_override() {
        let file = FilterConfig {
            de: Some("W6".to_string()),
            band: Some("20".to_string()),
            ..Default::default()
        };
        let cli = FilterConfig {
            band: Some("40".to_string()),
            ..Default::default()
        };
        let merged = file.merge(cli);
        assert_eq!(merged.de.as_deref(), Some("W6"));
        assert_eq!(merged.band.as_deref(), Some("40"));
    }
}
