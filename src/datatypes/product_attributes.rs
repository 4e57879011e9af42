use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};

use crate::codetables::LevelTableEntry;

/// Reference, valid and accumulation times of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForecastTime {
    pub init: DateTime<Utc>,
    pub valid: DateTime<Utc>,
    /// Accumulation length in seconds; `0` unless the time range indicator
    /// is 4.
    pub accumulation: i64,
}

impl ForecastTime {
    /// Returns the lead time in seconds.
    pub fn lead(&self) -> i64 {
        (self.valid - self.init).num_seconds()
    }
}

impl Display for ForecastTime {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "init {} valid {} (lead {} s",
            self.init.format("%Y-%m-%d %H:%M:%S"),
            self.valid.format("%Y-%m-%d %H:%M:%S"),
            self.lead()
        )?;
        if self.accumulation != 0 {
            write!(f, ", accumulation {} s", self.accumulation)?;
        }
        write!(f, ")")
    }
}

/// Vertical level of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Level {
    pub type_num: u8,
    pub lower: i32,
    pub upper: i32,
    pub entry: &'static LevelTableEntry,
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.lower == self.upper {
            write!(f, "{} {}", self.entry.abbrev, self.lower)
        } else {
            write!(f, "{} {}-{}", self.entry.abbrev, self.lower, self.upper)
        }
    }
}

/// NCEP ensemble extension of the product definition (octets 41-43).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnsembleInfo {
    pub application: u8,
    pub kind: u8,
    pub number: u8,
}

/// NCEP probability extension of the product definition (octets 46-55).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityInfo {
    pub code: u8,
    pub kind: u8,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl ProbabilityInfo {
    pub(crate) fn new(code: u8, kind: u8, t1: f64, t2: f64) -> Self {
        let (lower, upper) = match kind {
            1 => (None, Some(t1)),
            2 => (Some(t2), None),
            3 => (Some(t1), Some(t2)),
            _ => (None, None),
        };
        Self {
            code,
            kind,
            lower,
            upper,
        }
    }
}
