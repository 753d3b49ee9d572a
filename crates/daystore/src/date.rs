//! Calendar-day keys and the clock that produces them.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A local calendar day in canonical `YYYY-MM-DD` form.
///
/// Ordering is chronological, which is also the lexicographic order of the
/// canonical string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid date key {0:?}: expected YYYY-MM-DD")]
pub struct ParseDateKeyError(String);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parses a key, accepting only the zero-padded ten-character form.
    pub fn parse(s: &str) -> Result<Self, ParseDateKeyError> {
        let bytes = s.as_bytes();
        let shape_ok = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shape_ok {
            return Err(ParseDateKeyError(s.to_string()));
        }

        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| ParseDateKeyError(s.to_string()))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = ParseDateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Source of "today" for the store.
pub trait Clock {
    fn today(&self) -> DateKey;
}

/// The local calendar date of the machine running the job.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> DateKey {
        DateKey(Local::now().date_naive())
    }
}

/// Always reports the same day. Used for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateKey);

impl Clock for FixedClock {
    fn today(&self) -> DateKey {
        self.0
    }
}
