use std::collections::HashSet;

use ansi_term::{Colour, Style};

use crate::{
    ledger::{habits::HabitLedger, planner::ActivityLedger},
    stats::{
        schedule::{display_hours, today_tasks},
        streak_summary, weekly_balance, weekly_progress,
    },
    store::collection_store::CollectionStore,
    utils::{
        clock::Clock,
        time::{calculate_streak, day_name, start_of_week, week_dates, week_range},
    },
};

use super::color_swatch;

/// Today's schedule, merging planner activities with linked-habit completion
/// state. Completion marks for unlinked activities live only for the duration
/// of a session, so a fresh process shows them unchecked.
pub fn print_today<H, A>(
    habit_ledger: &HabitLedger<H>,
    activity_ledger: &ActivityLedger<A>,
    clock: &dyn Clock,
) where
    H: CollectionStore,
    A: CollectionStore,
{
    let today = clock.today();
    let local_done = HashSet::new();
    let tasks = today_tasks(
        activity_ledger.activities(),
        habit_ledger.habits(),
        habit_ledger.completions(),
        &local_done,
        today,
    );
    let hours = display_hours(activity_ledger.activities());

    println!(
        "{} {}  ({:02}:00 - {:02}:00)",
        day_name(today),
        today,
        hours.start(),
        hours.end(),
    );
    if tasks.is_empty() {
        println!("Nothing scheduled for today");
        return;
    }

    for task in tasks {
        let mark = if task.is_completed {
            Colour::Green.paint("[x]").to_string()
        } else {
            "[ ]".to_string()
        };
        let linked = task
            .linked_habit
            .map(|h| format!("\t🔗 {}", h.name))
            .unwrap_or_default();
        println!(
            "{mark} {} - {}\t{} {}{linked}",
            task.activity.start_time.format("%H:%M"),
            task.activity.end_time.format("%H:%M"),
            color_swatch(&task.activity.color),
            task.activity.title,
        );
    }
}

/// The current week's completion grid plus per-habit weekly balance.
pub fn print_week<S: CollectionStore>(ledger: &HabitLedger<S>, clock: &dyn Clock) {
    let today = clock.today();
    let week_start = start_of_week(today);
    let days = week_dates(week_start);

    println!("Week {}", week_range(week_start));
    let header: Vec<String> = days
        .iter()
        .map(|d| {
            let label = format!("{} {}", day_name(*d), d.format("%-d"));
            if *d == today {
                Style::new().bold().underline().paint(label).to_string()
            } else {
                label
            }
        })
        .collect();
    println!("\t{}", header.join("\t"));

    for habit in ledger.habits().iter().filter(|h| h.is_active) {
        let cells: Vec<String> = days
            .iter()
            .map(|d| {
                if ledger.is_completed_on(habit.id, *d) {
                    Colour::Green.paint("✓").to_string()
                } else {
                    "·".to_string()
                }
            })
            .collect();
        let balance = weekly_balance(habit, ledger.completions(), week_start);
        println!(
            "{} {}\t{}\t{}/{} ({}%)",
            color_swatch(&habit.color),
            habit.name,
            cells.join("\t"),
            balance.completed,
            balance.target,
            balance.percentage,
        );
    }

    println!(
        "Weekly progress: {}%",
        weekly_progress(ledger.habits(), ledger.completions(), week_start)
    );
}

pub fn print_stats<S: CollectionStore>(ledger: &HabitLedger<S>, clock: &dyn Clock) {
    let today = clock.today();
    let summary = streak_summary(ledger.habits(), ledger.completions(), today);
    let week_start = start_of_week(today);

    println!(
        "Completed today: {}/{}",
        summary.completed_today, summary.active_habits
    );
    println!(
        "Weekly progress: {}%",
        weekly_progress(ledger.habits(), ledger.completions(), week_start)
    );
    println!("Longest streak: {}", summary.longest);
    println!("Average streak: {}", summary.average);

    for habit in ledger.habits().iter().filter(|h| h.is_active) {
        let streak = calculate_streak(ledger.completions(), habit.id, today);
        let flame = if streak > 0 { " 🔥" } else { "" };
        println!(
            "{} {}\t{streak}{flame}",
            color_swatch(&habit.color),
            habit.name
        );
    }
}
