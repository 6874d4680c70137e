//! Common helper functions for output formatting.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use owo_colors::OwoColorize;
use tickwise_model::models::Priority;

/// Number of id characters shown in tables.
pub const SHORT_ID_LEN: usize = 8;

/// Truncates an ID for display.
pub fn truncate_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

/// Truncates a string to a maximum length in characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats priority for display.
pub fn format_priority(priority: Option<Priority>, use_colors: bool) -> String {
    let Some(priority) = priority else {
        return String::new();
    };
    let label = priority.as_str();

    if use_colors {
        match priority {
            Priority::P1 => label.red().to_string(),
            Priority::P2 => label.yellow().to_string(),
            Priority::P3 => label.blue().to_string(),
            Priority::P4 => label.dimmed().to_string(),
        }
    } else {
        label.to_string()
    }
}

/// Formats priority for verbose display (show command).
pub fn format_priority_verbose(priority: Option<Priority>, use_colors: bool) -> String {
    let label = match priority {
        Some(Priority::P1) => "p1 (highest)",
        Some(Priority::P2) => "p2 (high)",
        Some(Priority::P3) => "p3 (medium)",
        Some(Priority::P4) => "p4 (low)",
        None => "none",
    };

    if use_colors {
        match priority {
            Some(Priority::P1) => label.red().to_string(),
            Some(Priority::P2) => label.yellow().to_string(),
            Some(Priority::P3) => label.blue().to_string(),
            _ => label.dimmed().to_string(),
        }
    } else {
        label.to_string()
    }
}

/// Formats a due date for display in tables.
///
/// Relative ("Today", "3 days ago", "Mar 14") unless `iso` is set.
pub fn format_due(
    due_date: Option<NaiveDate>,
    today: NaiveDate,
    iso: bool,
    use_colors: bool,
) -> String {
    let Some(date) = due_date else {
        return String::new();
    };

    let display = if iso {
        date.format("%Y-%m-%d").to_string()
    } else {
        relative_date(date, today)
    };

    colorize_due(display, date, today, use_colors)
}

/// Formats a due date with time for the show command.
pub fn format_due_verbose(
    date: NaiveDate,
    time: Option<NaiveTime>,
    today: NaiveDate,
    iso: bool,
    use_colors: bool,
) -> String {
    let mut display = if iso {
        date.format("%Y-%m-%d").to_string()
    } else if date < today {
        let days = (today - date).num_days();
        if days == 1 {
            "Yesterday (1 day overdue)".to_string()
        } else {
            format!("{} ({days} days overdue)", date.format("%B %d, %Y"))
        }
    } else if date == today {
        "Today".to_string()
    } else if date == today + chrono::Duration::days(1) {
        "Tomorrow".to_string()
    } else {
        date.format("%A, %B %d, %Y").to_string()
    };

    if let Some(time) = time {
        display.push_str(&format!(" at {}", time.format("%H:%M")));
    }

    colorize_due(display, date, today, use_colors)
}

fn relative_date(date: NaiveDate, today: NaiveDate) -> String {
    let tomorrow = today + chrono::Duration::days(1);
    let yesterday = today - chrono::Duration::days(1);

    if date == today {
        "Today".to_string()
    } else if date == tomorrow {
        "Tomorrow".to_string()
    } else if date == yesterday {
        "Yesterday".to_string()
    } else if date < today {
        format!("{} days ago", (today - date).num_days())
    } else {
        date.format("%b %d").to_string()
    }
}

fn colorize_due(display: String, date: NaiveDate, today: NaiveDate, use_colors: bool) -> String {
    if !use_colors {
        return display;
    }
    if date < today {
        display.red().to_string()
    } else if date == today {
        display.yellow().to_string()
    } else {
        display
    }
}

/// Formats labels for display.
pub fn format_labels(labels: &BTreeSet<String>, max_len: usize) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let formatted: Vec<String> = labels.iter().map(|l| format!("@{l}")).collect();
    truncate_str(&formatted.join(" "), max_len)
}

/// Formats a timestamp in local time.
pub fn format_datetime(datetime: DateTime<Utc>) -> String {
    datetime
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
