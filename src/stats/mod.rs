pub mod schedule;

use chrono::NaiveDate;

use crate::{
    store::entities::{Habit, HabitCompletion},
    utils::time::{calculate_streak, week_dates},
};

/// Completed-versus-target summary for one habit over a 7-day window. Never
/// cached; recomputed from the source collections on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyBalance {
    pub completed: u32,
    pub target: u32,
    pub percentage: u32,
}

pub fn weekly_balance(
    habit: &Habit,
    completions: &[HabitCompletion],
    week_start: NaiveDate,
) -> WeeklyBalance {
    let completed = week_dates(week_start)
        .iter()
        .filter(|day| {
            completions
                .iter()
                .any(|c| c.habit_id == habit.id && c.date == **day)
        })
        .count() as u32;
    let target = habit.weekly_target();
    let percentage = if target == 0 {
        0
    } else {
        (((completed as f64 / target as f64) * 100.0).round() as u32).min(100)
    };
    WeeklyBalance {
        completed,
        target,
        percentage,
    }
}

/// Unweighted mean of per-habit percentages over active habits; 0 when there
/// are none.
pub fn weekly_progress(
    habits: &[Habit],
    completions: &[HabitCompletion],
    week_start: NaiveDate,
) -> u32 {
    let percentages: Vec<u32> = habits
        .iter()
        .filter(|h| h.is_active)
        .map(|h| weekly_balance(h, completions, week_start).percentage)
        .collect();
    if percentages.is_empty() {
        return 0;
    }
    (percentages.iter().sum::<u32>() as f64 / percentages.len() as f64).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakSummary {
    pub longest: u32,
    pub average: u32,
    pub completed_today: u32,
    pub active_habits: u32,
}

pub fn streak_summary(
    habits: &[Habit],
    completions: &[HabitCompletion],
    today: NaiveDate,
) -> StreakSummary {
    let streaks: Vec<u32> = habits
        .iter()
        .map(|h| calculate_streak(completions, h.id, today))
        .collect();
    let longest = streaks.iter().copied().max().unwrap_or(0);
    let average = if streaks.is_empty() {
        0
    } else {
        (streaks.iter().sum::<u32>() as f64 / streaks.len() as f64).round() as u32
    };
    StreakSummary {
        longest,
        average,
        completed_today: completions.iter().filter(|c| c.date == today).count() as u32,
        active_habits: habits.iter().filter(|h| h.is_active).count() as u32,
    }
}
