// src/calendar.rs
//! Pure month-grid derivation: no storage access, no side effects. The
//! store hands over a snapshot of canonical date strings and this module
//! turns a target month into a 7-column display grid plus a monthly count.

use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid month: '{0}' (expected YYYY-MM)")]
pub struct ParseYearMonthError(String);

/// A calendar year-month. Construction is validated, so month arithmetic
/// and grid building never have to re-check the month range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    /// The preceding calendar month. Plain arithmetic on the first of the
    /// month, so a 31st never has to be clamped.
    pub const fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The following calendar month.
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated year-month")
    }

    /// Number of days in this month, leap-year aware.
    pub fn days_in_month(self) -> u32 {
        let next_first = self.next().first_day();
        (next_first - self.first_day()).num_days() as u32
    }

    /// Weekday index of day 1, Sunday = 0 .. Saturday = 6. This is the
    /// number of blank leading cells in the grid.
    pub fn first_weekday_offset(self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    /// The `YYYY-MM` string used for the monthly count's prefix match.
    pub fn prefix(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Human-readable header, e.g. "February 2024".
    pub fn title(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Piggyback on chrono by parsing the first of the month.
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(Self::from_date)
            .map_err(|_| ParseYearMonthError(s.to_string()))
    }
}

/// One cell of the 7-column month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    /// Leading padding before day 1.
    Blank,
    /// A day of the month, flagged when its date is in the workout set.
    Day { day: u32, workout: bool },
}

/// Derived month layout. Never persisted; rebuilt on every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: YearMonth,
    pub cells: Vec<GridCell>,
    /// Workout days this month, counted by `YYYY-MM` string prefix over the
    /// input set (matching entries need not parse as dates).
    pub workout_count: usize,
}

/// Builds the display grid for a month against a set of canonical date
/// strings: `first_weekday_offset` blank cells, then day cells 1..=N, each
/// flagged by exact membership of its formatted date in the set.
pub fn build_month(month: YearMonth, dates: &HashSet<String>) -> MonthGrid {
    let offset = month.first_weekday_offset() as usize;
    let days = month.days_in_month();

    let mut cells = Vec::with_capacity(offset + days as usize);
    cells.extend(std::iter::repeat(GridCell::Blank).take(offset));
    for day in 1..=days {
        let formatted = format!("{:04}-{:02}-{:02}", month.year, month.month, day);
        cells.push(GridCell::Day {
            day,
            workout: dates.contains(&formatted),
        });
    }

    let prefix = month.prefix();
    let workout_count = dates.iter().filter(|d| d.starts_with(&prefix)).count();

    MonthGrid {
        month,
        cells,
        workout_count,
    }
}
