use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::Timelike;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// A recurring behavior tracked by calendar-day completions. Field names
/// serialize in camelCase; the persisted blob layout is the one durable
/// interface of the application.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub frequency: Frequency,
    /// Times per week, present iff `frequency` is custom. Enforced at the form
    /// boundary, not re-validated here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_frequency: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
}

impl Habit {
    /// Completions per week this habit aims for. Custom habits without a stored
    /// frequency fall back to 3.
    pub fn weekly_target(&self) -> u32 {
        match self.frequency {
            Frequency::Custom => self.custom_frequency.unwrap_or(3) as u32,
            Frequency::Daily | Frequency::Weekly => 7,
        }
    }
}

/// A record that a habit was performed on a given calendar day. At most one
/// exists per `(habit_id, date)` pair.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletion {
    pub id: Uuid,
    pub habit_id: Uuid,
    /// Serializes as "YYYY-MM-DD".
    pub date: NaiveDate,
    pub completed_at: DateTime<Utc>,
}

/// A scheduled, recurring time-boxed entry in the weekly planner, optionally
/// linked to a habit. A `linked_habit_id` pointing at a deleted habit is
/// tolerated and reads as "no linked habit".
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlannerActivity {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Weekday indices, 0 = Sunday through 6 = Saturday.
    pub days: BTreeSet<u8>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_habit_id: Option<Uuid>,
}

impl PlannerActivity {
    pub fn start_hour(&self) -> u32 {
        self.start_time.hour()
    }

    pub fn end_hour(&self) -> u32 {
        self.end_time.hour()
    }
}

/// Times persist as zero-padded "HH:MM" strings, which keeps their ordering
/// lexicographic in the stored blobs.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, "%H:%M").map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn activity_persists_in_camel_case_with_hhmm_times() {
        let activity = PlannerActivity {
            id: Uuid::nil(),
            title: "Morning run".into(),
            description: None,
            color: "#3B82F6".into(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            days: BTreeSet::from([0, 3]),
            created_at: Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap(),
            is_active: true,
            linked_habit_id: None,
        };

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["endTime"], "10:30");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["days"], serde_json::json!([0, 3]));
        assert!(json.get("linkedHabitId").is_none());

        let back: PlannerActivity = serde_json::from_value(json).unwrap();
        assert_eq!(back, activity);
    }

    #[test]
    fn completion_date_persists_as_calendar_day() {
        let completion = HabitCompletion {
            id: Uuid::nil(),
            habit_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            completed_at: Utc.with_ymd_and_hms(2025, 3, 2, 18, 4, 0).unwrap(),
        };
        let json = serde_json::to_value(&completion).unwrap();
        assert_eq!(json["date"], "2025-03-02");
        assert!(json.get("habitId").is_some());
    }

    #[test]
    fn weekly_target_by_frequency() {
        let mut habit = Habit {
            id: Uuid::nil(),
            name: "Read".into(),
            description: None,
            color: "#10B981".into(),
            frequency: Frequency::Daily,
            custom_frequency: None,
            created_at: Utc::now(),
            is_active: true,
        };
        assert_eq!(habit.weekly_target(), 7);

        habit.frequency = Frequency::Custom;
        assert_eq!(habit.weekly_target(), 3);
        habit.custom_frequency = Some(5);
        assert_eq!(habit.weekly_target(), 5);
    }
}
