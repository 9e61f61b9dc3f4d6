use std::{collections::HashSet, ops::RangeInclusive};

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::store::entities::{Habit, HabitCompletion, PlannerActivity};

/// One entry in the merged today view. `is_completed` comes from the linked
/// habit's completion on today when the link resolves, and from the ephemeral
/// `local_done` set otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct TodayTask<'a> {
    pub activity: &'a PlannerActivity,
    pub linked_habit: Option<&'a Habit>,
    pub is_completed: bool,
}

/// Active activities scheduled for today's weekday, ordered by start time.
/// `local_done` holds completion marks for unlinked activities; it is keyed by
/// activity id and never persisted.
pub fn today_tasks<'a>(
    activities: &'a [PlannerActivity],
    habits: &'a [Habit],
    completions: &[HabitCompletion],
    local_done: &HashSet<Uuid>,
    today: NaiveDate,
) -> Vec<TodayTask<'a>> {
    let weekday = today.weekday().num_days_from_sunday() as u8;

    let mut tasks: Vec<TodayTask<'a>> = activities
        .iter()
        .filter(|a| a.is_active && a.days.contains(&weekday))
        .map(|activity| {
            // A dangling link reads as "no linked habit".
            let linked_habit = activity
                .linked_habit_id
                .and_then(|id| habits.iter().find(|h| h.id == id));
            let is_completed = match linked_habit {
                Some(habit) => completions
                    .iter()
                    .any(|c| c.habit_id == habit.id && c.date == today),
                None => local_done.contains(&activity.id),
            };
            TodayTask {
                activity,
                linked_habit,
                is_completed,
            }
        })
        .collect();

    tasks.sort_by_key(|t| t.activity.start_time);
    tasks
}

/// Hour range shown by the schedule view. `[8, 19]` when no activity is
/// active, otherwise the union of every active activity's start..=end hours,
/// padded by one hour on each side and clamped to `[6, 23]`.
pub fn display_hours(activities: &[PlannerActivity]) -> RangeInclusive<u32> {
    let mut hours = activities
        .iter()
        .filter(|a| a.is_active)
        .map(|a| (a.start_hour(), a.end_hour()))
        .peekable();
    if hours.peek().is_none() {
        return 8..=19;
    }

    let (mut first, mut last) = (u32::MAX, 0);
    for (start, end) in hours {
        first = first.min(start);
        last = last.max(end);
    }
    first.saturating_sub(1).max(6)..=(last + 1).min(23)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{NaiveTime, Utc};

    use crate::store::entities::Frequency;

    use super::*;

    fn activity(title: &str, start: &str, end: &str, days: &[u8]) -> PlannerActivity {
        PlannerActivity {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            color: "#F59E0B".into(),
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            days: days.iter().copied().collect::<BTreeSet<u8>>(),
            created_at: Utc::now(),
            is_active: true,
            linked_habit_id: None,
        }
    }

    fn habit() -> Habit {
        Habit {
            id: Uuid::new_v4(),
            name: "Meditate".into(),
            description: None,
            color: "#3B82F6".into(),
            frequency: Frequency::Daily,
            custom_frequency: None,
            created_at: Utc::now(),
            is_active: true,
        }
    }

    fn completion(habit_id: Uuid, date: NaiveDate) -> HabitCompletion {
        HabitCompletion {
            id: Uuid::new_v4(),
            habit_id,
            date,
            completed_at: Utc::now(),
        }
    }

    // A Wednesday, weekday index 3.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
    }

    #[test]
    fn tasks_are_sorted_by_start_time() {
        let activities = vec![
            activity("Afternoon", "14:00", "15:00", &[3]),
            activity("Morning", "09:00", "10:00", &[3]),
            activity("Wrong day", "08:00", "09:00", &[5]),
        ];

        let tasks = today_tasks(&activities, &[], &[], &HashSet::new(), today());
        let titles: Vec<_> = tasks.iter().map(|t| t.activity.title.as_str()).collect();
        assert_eq!(titles, ["Morning", "Afternoon"]);
    }

    #[test]
    fn inactive_activities_are_excluded() {
        let mut gym = activity("Gym", "18:00", "19:00", &[3]);
        gym.is_active = false;
        let activities = [gym];

        let tasks = today_tasks(&activities, &[], &[], &HashSet::new(), today());
        assert!(tasks.is_empty());
    }

    #[test]
    fn linked_habit_completion_drives_task_state() {
        let habit = habit();
        let mut gym = activity("Gym", "18:00", "19:00", &[3]);
        gym.linked_habit_id = Some(habit.id);
        let activities = vec![gym];
        let habits = vec![habit.clone()];

        let done = vec![completion(habit.id, today())];
        let tasks = today_tasks(&activities, &habits, &done, &HashSet::new(), today());
        assert!(tasks[0].is_completed);

        // Removing the completion flips the task without touching the activity.
        let tasks = today_tasks(&activities, &habits, &[], &HashSet::new(), today());
        assert!(!tasks[0].is_completed);
        assert_eq!(tasks[0].activity.linked_habit_id, Some(habit.id));
    }

    #[test]
    fn dangling_link_falls_back_to_the_local_set() {
        let mut gym = activity("Gym", "18:00", "19:00", &[3]);
        gym.linked_habit_id = Some(Uuid::new_v4());
        let activities = vec![gym];

        let tasks = today_tasks(&activities, &[], &[], &HashSet::new(), today());
        assert!(tasks[0].linked_habit.is_none());
        assert!(!tasks[0].is_completed);

        let local_done = HashSet::from([activities[0].id]);
        let tasks = today_tasks(&activities, &[], &[], &local_done, today());
        assert!(tasks[0].is_completed);
    }

    #[test]
    fn display_hours_default_without_active_activities() {
        assert_eq!(display_hours(&[]), 8..=19);

        let mut gym = activity("Gym", "18:00", "19:00", &[3]);
        gym.is_active = false;
        assert_eq!(display_hours(&[gym]), 8..=19);
    }

    #[test]
    fn display_hours_pad_and_clamp() {
        let activities = vec![
            activity("Early", "07:00", "08:00", &[1]),
            activity("Late", "21:30", "23:00", &[2]),
        ];
        assert_eq!(display_hours(&activities), 6..=23);

        let midday = vec![activity("Lunch", "12:00", "13:00", &[1])];
        assert_eq!(display_hours(&midday), 11..=14);
    }
}
