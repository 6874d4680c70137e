//! Recurrence calculation.
//!
//! Pure functions over [`RecurrencePattern`]: finding the next occurrence,
//! expanding occurrences in a window, validating patterns and rendering a
//! short description.
//!
//! Rules, with `n = interval`:
//!
//! - `Daily`: every `n` days from the start date.
//! - `Weekly`: every `n` weeks on the start date's weekday.
//! - `Monthly`: every `n` months on the start day-of-month, clamped to the
//!   last day of shorter months.
//! - `Yearly`: every `n` years on the start month and day (Feb 29 becomes
//!   Feb 28 in common years).
//! - `Custom`: the listed weekdays in every `n`-th Monday-based week,
//!   counted from the week containing the start date.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use thiserror::Error;
use tickwise_model::models::{Frequency, RecurrencePattern};

/// Upper bound on candidate dates examined by a single search.
const MAX_SEARCH_STEPS: u32 = 10_000;

/// Reasons a recurrence pattern is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    /// The interval is zero.
    #[error("recurrence interval must be at least 1")]
    ZeroInterval,

    /// A custom pattern lists no weekdays.
    #[error("custom recurrence needs at least one weekday")]
    EmptyWeekdays,

    /// A custom pattern lists the same weekday twice.
    #[error("weekday {0} is listed more than once")]
    DuplicateWeekday(Weekday),

    /// The end date precedes the start date.
    #[error("recurrence ends on {end} before it starts on {start}")]
    EndBeforeStart {
        /// First date of the series.
        start: NaiveDate,
        /// Last date of the series.
        end: NaiveDate,
    },
}

/// Checks that a pattern can produce occurrences.
pub fn validate_pattern(pattern: &RecurrencePattern) -> Result<(), RecurrenceError> {
    if pattern.interval == 0 {
        return Err(RecurrenceError::ZeroInterval);
    }

    if pattern.frequency == Frequency::Custom {
        if pattern.days_of_week.is_empty() {
            return Err(RecurrenceError::EmptyWeekdays);
        }
        let mut seen = Vec::with_capacity(pattern.days_of_week.len());
        for day in &pattern.days_of_week {
            if seen.contains(day) {
                return Err(RecurrenceError::DuplicateWeekday(*day));
            }
            seen.push(*day);
        }
    }

    if let Some(end) = pattern.end_date {
        if end < pattern.start_date {
            return Err(RecurrenceError::EndBeforeStart {
                start: pattern.start_date,
                end,
            });
        }
    }

    Ok(())
}

/// Boolean form of [`validate_pattern`].
pub fn is_valid_pattern(pattern: &RecurrencePattern) -> bool {
    validate_pattern(pattern).is_ok()
}

/// Returns the first occurrence on or after `from`.
///
/// Exceptions are skipped. Returns `None` when the series has ended, the
/// pattern is invalid, or nothing is found within the search bound.
pub fn next_occurrence(from: NaiveDate, pattern: &RecurrencePattern) -> Option<NaiveDate> {
    search(from, pattern, true)
}

/// Returns true if the rule produces `date`, ignoring exceptions.
pub fn generates(pattern: &RecurrencePattern, date: NaiveDate) -> bool {
    search(date, pattern, false) == Some(date)
}

/// Expands up to `limit` occurrences in `from..=to`.
pub fn occurrences_between(
    pattern: &RecurrencePattern,
    from: NaiveDate,
    to: NaiveDate,
    limit: usize,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut cursor = from;

    while dates.len() < limit {
        let Some(date) = next_occurrence(cursor, pattern) else {
            break;
        };
        if date > to {
            break;
        }
        dates.push(date);
        let Some(next) = date.succ_opt() else {
            break;
        };
        cursor = next;
    }

    dates
}

/// Renders a short human description such as `every 2 weeks`.
pub fn describe(pattern: &RecurrencePattern) -> String {
    let n = pattern.interval;
    let unit = |singular: &str| {
        if n == 1 {
            format!("every {singular}")
        } else {
            format!("every {n} {singular}s")
        }
    };

    let mut text = match pattern.frequency {
        Frequency::Daily => unit("day"),
        Frequency::Weekly => unit("week"),
        Frequency::Monthly => unit("month"),
        Frequency::Yearly => unit("year"),
        Frequency::Custom => {
            let days = pattern
                .days_of_week
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if n == 1 {
                format!("every {days}")
            } else {
                format!("every {n} weeks on {days}")
            }
        }
    };

    if let Some(end) = pattern.end_date {
        text.push_str(&format!(" until {end}"));
    }
    text
}

fn search(from: NaiveDate, pattern: &RecurrencePattern, skip_exceptions: bool) -> Option<NaiveDate> {
    if !is_valid_pattern(pattern) {
        return None;
    }
    let from = from.max(pattern.start_date);
    if pattern.has_ended_before(from) {
        return None;
    }

    let accept = |date: NaiveDate| !(skip_exceptions && pattern.is_exception(date));

    match pattern.frequency {
        Frequency::Custom => search_custom(from, pattern, accept),
        _ => search_periodic(from, pattern, accept),
    }
}

/// Walks the `k`-th occurrences of a fixed-period rule.
fn search_periodic(
    from: NaiveDate,
    pattern: &RecurrencePattern,
    accept: impl Fn(NaiveDate) -> bool,
) -> Option<NaiveDate> {
    let mut k = first_index_estimate(from, pattern);

    for _ in 0..MAX_SEARCH_STEPS {
        let candidate = nth_occurrence(pattern, k)?;
        k += 1;
        if candidate < from {
            continue;
        }
        if pattern.has_ended_before(candidate) {
            return None;
        }
        if accept(candidate) {
            return Some(candidate);
        }
    }

    None
}

/// An index no later than the first occurrence on or after `from`.
fn first_index_estimate(from: NaiveDate, pattern: &RecurrencePattern) -> u64 {
    let start = pattern.start_date;
    let interval = u64::from(pattern.interval);
    match pattern.frequency {
        Frequency::Daily | Frequency::Weekly => {
            let step = if pattern.frequency == Frequency::Daily {
                interval
            } else {
                interval * 7
            };
            let elapsed = u64::try_from((from - start).num_days()).unwrap_or(0);
            elapsed / step
        }
        Frequency::Monthly => {
            let months = i64::from(from.year() - start.year()) * 12 + i64::from(from.month())
                - i64::from(start.month());
            u64::try_from(months).unwrap_or(0) / interval
        }
        Frequency::Yearly => {
            let years = i64::from(from.year() - start.year());
            u64::try_from(years).unwrap_or(0) / interval
        }
        Frequency::Custom => 0,
    }
}

/// The `k`-th date produced by a fixed-period rule.
fn nth_occurrence(pattern: &RecurrencePattern, k: u64) -> Option<NaiveDate> {
    let start = pattern.start_date;
    let interval = u64::from(pattern.interval);
    let steps = k.checked_mul(interval)?;

    match pattern.frequency {
        Frequency::Daily => start.checked_add_days(Days::new(steps)),
        Frequency::Weekly => start.checked_add_days(Days::new(steps.checked_mul(7)?)),
        Frequency::Monthly => add_months_clamped(start, steps),
        Frequency::Yearly => add_months_clamped(start, steps.checked_mul(12)?),
        Frequency::Custom => None,
    }
}

/// Adds months keeping the start day, clamped to the month's last day.
fn add_months_clamped(start: NaiveDate, months: u64) -> Option<NaiveDate> {
    let months = u32::try_from(months).ok()?;
    // chrono clamps to the last valid day of the target month
    start.checked_add_months(Months::new(months))
}

/// Walks aligned weeks, testing each listed weekday in order.
fn search_custom(
    from: NaiveDate,
    pattern: &RecurrencePattern,
    accept: impl Fn(NaiveDate) -> bool,
) -> Option<NaiveDate> {
    let interval = u64::from(pattern.interval);
    let start_week = week_monday(pattern.start_date)?;
    let mut week = week_monday(from)?;

    let weeks_since = u64::try_from((week - start_week).num_weeks()).unwrap_or(0);
    let misalignment = weeks_since % interval;
    if misalignment != 0 {
        week = week.checked_add_days(Days::new((interval - misalignment) * 7))?;
    }

    for _ in 0..MAX_SEARCH_STEPS {
        for offset in 0..7 {
            let day = week.checked_add_days(Days::new(offset))?;
            if day < from {
                continue;
            }
            if pattern.has_ended_before(day) {
                return None;
            }
            if pattern.days_of_week.contains(&day.weekday()) && accept(day) {
                return Some(day);
            }
        }
        week = week.checked_add_days(Days::new(interval * 7))?;
    }

    None
}

fn week_monday(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}
