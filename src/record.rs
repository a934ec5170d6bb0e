//! Data structures representing RBN spots.
//!
//! A [`Record`] is built once per successfully parsed line and never
//! mutated afterwards.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::band::{Band, BandTable};

/// Reported speed: the numeric value and its unit token (usually `WPM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speed {
    pub value: u32,
    pub unit: String,
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// A parsed spot from the Reverse Beacon Network.
///
/// # Example
///
/// A raw spot like:
/// ```text
/// DX de EA5WU-#:    7018.3  RW1M           CW    19 dB  18 WPM  CQ      2259Z
/// ```
///
/// is parsed into a `Record` with:
/// - `station_dx`: "EA5WU-#" (the skimmer)
/// - `frequency`: 7018.3
/// - `station_de`: "RW1M" (the transmitting station)
/// - `mode`: "CW"
/// - `signal_strength`: 19
/// - `speed`: 18 WPM
/// - `record_type`: "CQ"
/// - `time`: 22:59 UTC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The skimmer that heard the transmission.
    pub station_dx: String,

    /// Frequency in kHz, exactly as received.
    pub frequency: f64,

    /// The station that transmitted.
    pub station_de: String,

    /// Mode token, kept verbatim.
    pub mode: String,

    /// Signal-to-noise ratio in dB.
    pub signal_strength: i32,

    pub speed: Speed,

    /// Activity token such as `CQ`, `BEACON` or `NCDXF B`.
    pub record_type: String,

    /// UTC time of the spot (time only, no date).
    pub time: NaiveTime,
}

impl Record {
    /// Band from the standard table, `None` above its top bound.
    pub fn band(&self) -> Option<Band> {
        self.band_in(BandTable::standard())
    }

    /// Band from a caller-supplied table.
    pub fn band_in(&self, table: &BandTable) -> Option<Band> {
        table.classify(self.frequency)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let band = self
            .band()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{:02}:{:02}Z  DX de {:<12}  {:>5}  {:>10}  {:<14}  {:<8}  {:>6}  {}\t{}",
            self.time.hour(),
            self.time.minute(),
            format!("{}:", self.station_dx),
            band,
            format!("{:?}", self.frequency),
            self.station_de,
            self.mode,
            format!("{} dB", self.signal_strength),
            self.speed,
            self.record_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(freq: f64) -> Record {
        Record {
            station_dx: "TEST-#".to_string(),
            frequency: freq,
            station_de: "W1AW".to_string(),
            mode: "CW".to_string(),
            signal_strength: 10,
            speed: Speed {
                value: 20,
                unit: "WPM".to_string(),
            },
            record_type: "CQ".to_string(),
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_band_detection() {
        assert_eq!(make_record(14025.0).band(), Some(Band(20.0)));
        assert_eq!(make_record(7000.0).band(), Some(Band(40.0)));
        assert_eq!(make_record(5_000_000.0).band(), None);
    }

    #[test]
    fn test_band_in_custom_table() {
        let table = BandTable::new(vec![(Band(20.0), 14_350.0)]).unwrap();
        assert_eq!(make_record(14025.0).band_in(&table), Some(Band(20.0)));
        assert_eq!(make_record(18_100.0).band_in(&table), None);
    }

    #[test]
    fn test_display_exposes_every_field() {
        let record = Record {
            time: NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
            ..make_record(14025.0)
        };
        let line = record.to_string();

        assert!(line.starts_with("09:05Z  DX de TEST-#:"));
        assert!(line.contains("20m"));
        assert!(line.contains("14025.0"));
        assert!(line.contains("W1AW"));
        assert!(line.contains("CW"));
        assert!(line.contains("10 dB"));
        assert!(line.contains("20 WPM"));
        assert!(line.ends_with("\tCQ"));
    }

    #[test]
    fn test_display_keeps_frequency_precision() {
        let line = make_record(14074.05).to_string();
        assert!(line.contains("   14074.05  W1AW"), "{}", line);

        let line = make_record(7018.3).to_string();
        assert!(line.contains("    7018.3  W1AW"), "{}", line);
    }

    #[test]
    fn test_display_without_band() {
        let line = make_record(5_000_000.0).to_string();
        assert!(line.contains("  -  "));
    }

    #[test]
    fn test_json_serialization() {
        let json = serde_json::to_value(make_record(14025.0)).unwrap();
        assert_eq!(json["station_de"], "W1AW");
        assert_eq!(json["speed"]["value"], 20);
        assert_eq!(json["speed"]["unit"], "WPM");
        assert_eq!(json["time"], "12:00:00");
    }
}
