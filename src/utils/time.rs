use std::collections::HashSet;

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use uuid::Uuid;

use crate::store::entities::HabitCompletion;

/// This is the standard way of converting a date to a string in habitline.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns the Sunday that opens the week containing `date`. Weeks run Sunday
/// through Saturday, with Sunday at weekday index 0.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// The 7 dates of a week, in order, beginning at `start`.
pub fn week_dates(start: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

/// Display range for the week opening at `start`, collapsing the month name
/// when both ends share it. "Mar 2 - 8", "Mar 30 - Apr 5".
pub fn week_range(start: NaiveDate) -> String {
    let end = start + Duration::days(6);
    if start.month() == end.month() {
        format!("{} - {}", start.format("%b %-d"), end.day())
    } else {
        format!("{} - {}", start.format("%b %-d"), end.format("%b %-d"))
    }
}

/// Whether `date` falls on the current local calendar day.
pub fn is_today(date: NaiveDate) -> bool {
    date == Local::now().date_naive()
}

pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

/// Count of consecutive calendar days ending at `today` with a completion for
/// `habit_id`. The walk starts at `today` itself, so a habit completed
/// yesterday but not today has a streak of 0.
pub fn calculate_streak(
    completions: &[HabitCompletion],
    habit_id: Uuid,
    today: NaiveDate,
) -> u32 {
    let completed_days: HashSet<NaiveDate> = completions
        .iter()
        .filter(|c| c.habit_id == habit_id)
        .map(|c| c.date)
        .collect();

    let mut streak = 0;
    let mut current = today;
    while completed_days.contains(&current) {
        streak += 1;
        current = current - Duration::days(1);
    }
    streak
}
