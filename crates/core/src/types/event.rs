//! Event calendar types.

use core::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Whether an event day is priced as a weekday or as a holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    #[default]
    Weekday,
    Holiday,
}

impl DayType {
    /// Classify a date: weekends and listed holidays are `Holiday`.
    #[must_use]
    pub fn classify(date: NaiveDate, holidays: &[NaiveDate]) -> Self {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || holidays.contains(&date) {
            Self::Holiday
        } else {
            Self::Weekday
        }
    }
}

/// A bookable time slot (one product variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSlot {
    /// Start time label, e.g. `14:30`.
    pub label: String,
    /// Numeric variant ID (used by the storefront cart).
    pub id: u64,
    /// Remaining tickets.
    pub rem: i64,
    /// Whether the slot can still be booked.
    pub available: bool,
}

/// One event day with its slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDay {
    /// ISO date of the event.
    pub date: NaiveDate,
    /// Product handle.
    pub handle: String,
    /// Pricing day type.
    pub day_type: DayType,
    /// `true` if any slot is available.
    pub available: bool,
    /// Sum of remaining tickets across slots.
    pub remaining: i64,
    /// Time slots in display order.
    pub slots: Vec<EventSlot>,
}

impl EventDay {
    /// Build a day from its slots, deriving the aggregate fields.
    #[must_use]
    pub fn new(date: NaiveDate, handle: String, day_type: DayType, slots: Vec<EventSlot>) -> Self {
        let remaining = slots.iter().map(|s| s.rem).sum();
        let available = slots.iter().any(|s| s.available);
        Self {
            date,
            handle,
            day_type,
            available,
            remaining,
            slots,
        }
    }
}

/// Errors that can occur when parsing a [`Month`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("month must be formatted as YYYY-MM, got {0:?}")]
pub struct MonthError(String);

/// A calendar month, formatted `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Parse a month from `YYYY-MM`.
    ///
    /// # Errors
    ///
    /// Returns [`MonthError`] if the input is not four digits, a dash, and
    /// two digits forming a month between 01 and 12.
    pub fn parse(s: &str) -> Result<Self, MonthError> {
        let err = || MonthError(s.to_owned());

        let (year, month) = s.split_once('-').ok_or_else(err)?;
        let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(year, 4) || !digits(month, 2) {
            return Err(err());
        }

        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) {
            return Err(err());
        }

        Ok(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns `true` if `date` falls within this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for Month {
    type Err = MonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Month {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
