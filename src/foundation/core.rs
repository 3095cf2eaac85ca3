use chrono::{Datelike, NaiveDate};

use crate::foundation::error::{ReittiError, ReittiResult};

/// A `(latitude, longitude)` pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `[lat, lon]`, the pair order Leaflet expects.
    pub fn as_latlng(self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// A calendar day without a year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> ReittiResult<Self> {
        // 2000 is a leap year, so Feb 29 is accepted here and filtered per year later.
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(ReittiError::config(format!(
                "invalid month/day {month:02}-{day:02}"
            )));
        }
        Ok(Self { month, day })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn day(self) -> u32 {
        self.day
    }

    /// `MM-DD`.
    pub fn label(self) -> String {
        format!("{:02}-{:02}", self.month, self.day)
    }

    /// The date this day falls on in `year`, or `None` when it does not exist
    /// (Feb 29 outside leap years).
    pub fn in_year(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

impl std::fmt::Display for MonthDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Inclusive range of calendar years.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> ReittiResult<Self> {
        if start > end {
            return Err(ReittiError::config(format!(
                "start year {start} is after end year {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn years(self) -> std::ops::RangeInclusive<i32> {
        self.start..=self.end
    }

    pub fn len(self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn is_empty(self) -> bool {
        self.start > self.end
    }

    /// `START-END`, used in output file names.
    pub fn label(self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> ReittiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        ReittiError::config(format!(
            "invalid date '{raw}' (expected YYYY-MM-DD): {e}"
        ))
    })
}
