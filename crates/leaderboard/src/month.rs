//! Monthly reset of leaderboards whose subtitle names a past month.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::traits::{Clock, SystemClock};

/// Hours added to UTC before reading the calendar month (UTC+7).
pub const DEFAULT_HOUR_OFFSET: i64 = 7;

/// Accepted offsets, in hours either side of UTC.
pub const HOUR_OFFSET_RANGE: std::ops::RangeInclusive<i64> = -24..=24;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// `"<FullMonthName> <Year>"` for `now` shifted by `hour_offset` hours.
///
/// An offset that does not fit a time delta leaves `now` unshifted.
pub fn month_label(now: DateTime<Utc>, hour_offset: i64) -> String {
    TimeDelta::try_hours(hour_offset)
        .and_then(|offset| now.checked_add_signed(offset))
        .unwrap_or(now)
        .format("%B %Y")
        .to_string()
}

pub fn current_month_label(hour_offset: i64) -> String {
    month_label(Utc::now(), hour_offset)
}

/// True only for text of the exact form `"<FullMonthName> <4-digit year>"`.
///
/// Month names match case-insensitively; surrounding whitespace is not allowed.
pub fn is_recognized_month_label(text: &str) -> bool {
    if text != text.trim() {
        return false;
    }

    let mut parts = text.split_whitespace();
    let (Some(month), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    MONTH_NAMES.iter().any(|m| m.eq_ignore_ascii_case(month))
        && year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
}

/// Decides when a leaderboard starts over for a new month.
///
/// Subtitles that are not month labels are custom titles and never roll over.
#[derive(Clone)]
pub struct MonthPolicy {
    hour_offset: i64,
    clock: Arc<dyn Clock>,
}

impl MonthPolicy {
    pub fn new(hour_offset: i64, clock: Arc<dyn Clock>) -> Self {
        Self { hour_offset, clock }
    }

    pub fn current_month_label(&self) -> String {
        month_label(self.clock.now(), self.hour_offset)
    }

    pub fn should_roll_over(&self, subtitle: &str) -> bool {
        is_recognized_month_label(subtitle) && subtitle.trim() != self.current_month_label()
    }

    /// Reset snapshot `lines` to title plus the current month when stale.
    ///
    /// Returns whether the lines were reset.
    pub fn roll_over(&self, lines: &mut Vec<String>) -> bool {
        if lines.len() < 2 || !self.should_roll_over(&lines[1]) {
            return false;
        }

        lines.truncate(2);
        lines[1] = self.current_month_label();
        true
    }
}

impl Default for MonthPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_HOUR_OFFSET, Arc::new(SystemClock))
    }
}
