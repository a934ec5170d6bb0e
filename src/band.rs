//! Amateur radio band classification.
//!
//! Bands are derived from a spot's frequency by walking an ordered table of
//! upper bounds. The table is plain data so it can be swapped or extended
//! without touching the lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// A band label in meters.
///
/// Labels may be fractional (`1.25`). Negative labels are the centimeter
/// convention: `-0.7` is the 70cm band.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Band(pub f64);

impl Band {
    /// Band label for a wavelength given in centimeters.
    pub fn from_cm(cm: f64) -> Self {
        Band(-(cm / 100.0))
    }

    /// True for labels using the centimeter convention.
    pub fn is_cm(&self) -> bool {
        self.0 < 0.0
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cm() {
            write!(f, "{}cm", -self.0 * 100.0)
        } else {
            write!(f, "{}m", self.0)
        }
    }
}

/// Errors from parsing band labels or building a band table.
#[derive(Debug, Error, PartialEq)]
pub enum BandTableError {
    #[error("Invalid band label: '{0}'")]
    InvalidLabel(String),

    #[error("Band bounds must be strictly ascending: {previous} kHz followed by {next} kHz")]
    NotAscending { previous: f64, next: f64 },

    #[error("Band table is empty")]
    Empty,
}

impl FromStr for Band {
    type Err = BandTableError;

    /// Accepts `20`, `20m`, `1.25`, `1.25m` or `70cm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || BandTableError::InvalidLabel(s.to_string());

        if let Some(cm) = s.strip_suffix("cm") {
            let cm: f64 = cm.parse().map_err(|_| invalid())?;
            if !cm.is_finite() || cm <= 0.0 {
                return Err(invalid());
            }
            return Ok(Band::from_cm(cm));
        }

        let meters = s.strip_suffix('m').unwrap_or(s);
        let value: f64 = meters.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(Band(value))
    }
}

/// Ordered `(band, upper bound in kHz)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    entries: Vec<(Band, f64)>,
}

/// HF through 23cm, bounds in kHz.
const STANDARD_BANDS: &[(f64, f64)] = &[
    (160.0, 2_500.0),
    (80.0, 5_000.0),
    (40.0, 8_500.0),
    (30.0, 12_000.0),
    (20.0, 16_000.0),
    (17.0, 19_500.0),
    (15.0, 22_000.0),
    (12.0, 26_500.0),
    (10.0, 45_000.0),
    (6.0, 65_000.0),
    (4.0, 120_000.0),
    (2.0, 160_000.0),
    (1.25, 300_000.0),
    (-0.7, 500_000.0),
    (-0.33, 1_000_000.0),
    (-0.23, 1_400_000.0),
];

static STANDARD: LazyLock<BandTable> = LazyLock::new(|| BandTable {
    entries: STANDARD_BANDS
        .iter()
        .map(|&(band, bound)| (Band(band), bound))
        .collect(),
});

impl BandTable {
    /// Build a table, rejecting empty or non-ascending bounds.
    pub fn new(entries: Vec<(Band, f64)>) -> Result<Self, BandTableError> {
        if entries.is_empty() {
            return Err(BandTableError::Empty);
        }
        for pair in entries.windows(2) {
            let (previous, next) = (pair[0].1, pair[1].1);
            if next <= previous {
                return Err(BandTableError::NotAscending { previous, next });
            }
        }
        Ok(Self { entries })
    }

    /// The process-wide default table.
    pub fn standard() -> &'static BandTable {
        &STANDARD
    }

    /// Index of the first entry whose bound strictly exceeds `frequency_khz`.
    pub fn position(&self, frequency_khz: f64) -> Option<usize> {
        self.entries
            .iter()
            .position(|&(_, bound)| frequency_khz < bound)
    }

    /// Classify a frequency, or `None` if it is above every bound.
    pub fn classify(&self, frequency_khz: f64) -> Option<Band> {
        self.position(frequency_khz).map(|i| self.entries[i].0)
    }

    /// The highest bound in the table.
    pub fn max_bound(&self) -> f64 {
        self.entries.last().map(|&(_, bound)| bound).unwrap_or(0.0)
    }

    pub fn entries(&self) -> &[(Band, f64)] {
        &self.entries
    }
}

impl Default for BandTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}
