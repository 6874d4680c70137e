//! Recurrence pattern attached to a series anchor.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// How often a series repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every `interval` days.
    Daily,
    /// Every `interval` weeks on the start date's weekday.
    Weekly,
    /// Every `interval` months on the start date's day of month.
    Monthly,
    /// Every `interval` years on the start date's month and day.
    Yearly,
    /// Every `interval` weeks on each of the listed weekdays.
    Custom,
}

impl Frequency {
    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
            Frequency::Custom => "custom",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "days" => Ok(Frequency::Daily),
            "weekly" | "week" | "weeks" => Ok(Frequency::Weekly),
            "monthly" | "month" | "months" => Ok(Frequency::Monthly),
            "yearly" | "year" | "years" | "annually" => Ok(Frequency::Yearly),
            "custom" => Ok(Frequency::Custom),
            _ => Err(ModelError::invalid_frequency(s)),
        }
    }
}

/// The repetition rule of a recurring task.
///
/// Occurrences start at `start_date`, never fall after `end_date`, and skip
/// every date in `exceptions`. The exception set only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    /// The base repetition unit.
    pub frequency: Frequency,

    /// Number of units between occurrences (must be at least 1).
    #[serde(default = "default_interval")]
    pub interval: u32,

    /// Weekdays used by [`Frequency::Custom`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<Weekday>,

    /// First date the series may produce.
    pub start_date: NaiveDate,

    /// Last date the series may produce (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Dates skipped by the series.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exceptions: BTreeSet<NaiveDate>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrencePattern {
    /// Creates a pattern repeating every unit from `start_date`.
    pub fn new(frequency: Frequency, start_date: NaiveDate) -> Self {
        Self {
            frequency,
            interval: 1,
            days_of_week: Vec::new(),
            start_date,
            end_date: None,
            exceptions: BTreeSet::new(),
        }
    }

    /// Sets the interval.
    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the weekdays for custom patterns.
    pub fn on(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.days_of_week = days.into_iter().collect();
        self
    }

    /// Sets the inclusive end date.
    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Adds a skipped date. Returns false if it was already present.
    pub fn add_exception(&mut self, date: NaiveDate) -> bool {
        self.exceptions.insert(date)
    }

    /// Returns true if `date` is skipped.
    pub fn is_exception(&self, date: NaiveDate) -> bool {
        self.exceptions.contains(&date)
    }

    /// Returns true if the series has ended before `date`.
    pub fn has_ended_before(&self, date: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < date)
    }
}

/// Parses a single weekday name (`mon`, `Monday`, ...).
pub fn parse_weekday(s: &str) -> Result<Weekday, ModelError> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| ModelError::invalid_weekday(s))
}

/// Parses a comma-separated weekday list (`mon,wed,fri`).
pub fn parse_weekdays(s: &str) -> Result<Vec<Weekday>, ModelError> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_weekday)
        .collect()
}
