use std::collections::BTreeSet;

use anyhow::{bail, Result};
use chrono::NaiveTime;
use clap::Subcommand;
use uuid::Uuid;

use crate::{
    ledger::{
        habits::HabitLedger,
        planner::{ActivityDraft, ActivityLedger},
    },
    store::collection_store::CollectionStore,
};

use super::{color_swatch, habits::resolve_habit, validation_error};

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    #[command(about = "Schedule a recurring activity")]
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "#8B5CF6", help = "Hex color used when rendering")]
        color: String,
        #[arg(long, help = "Start of the slot as HH:MM, for example 09:00")]
        start: String,
        #[arg(long, help = "End of the slot as HH:MM, must be after --start")]
        end: String,
        #[arg(
            long,
            help = "Days of the week, comma separated. Accepts names or indices with Sunday as 0: \"mon,wed,fri\" or \"1,3,5\""
        )]
        days: String,
        #[arg(long, help = "Name or id of a habit to link the activity to")]
        habit: Option<String>,
    },
    #[command(about = "Edit a scheduled activity")]
    Edit {
        #[arg(help = "Activity title or id")]
        selector: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        days: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    #[command(about = "List scheduled activities")]
    List,
    #[command(about = "Delete a scheduled activity")]
    Remove {
        #[arg(help = "Activity title or id")]
        selector: String,
    },
}

pub async fn process_activity_command<S, H>(
    command: ActivityCommand,
    ledger: &mut ActivityLedger<S>,
    habit_ledger: &HabitLedger<H>,
) -> Result<()>
where
    S: CollectionStore,
    H: CollectionStore,
{
    match command {
        ActivityCommand::Add {
            title,
            description,
            color,
            start,
            end,
            days,
            habit,
        } => {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(validation_error("Activity title can't be empty"));
            }
            let start_time = parse_time(&start)?;
            let end_time = parse_time(&end)?;
            if start_time >= end_time {
                return Err(validation_error("--end must be after --start"));
            }
            let days = parse_days(&days)?;
            // The link is resolved once, at creation. It is stored as a bare
            // id afterwards and never revisited.
            let linked_habit_id = match habit {
                Some(selector) => Some(resolve_habit(habit_ledger, &selector)?),
                None => None,
            };

            let id = ledger
                .add_activity(ActivityDraft {
                    title: title.clone(),
                    description,
                    color,
                    start_time,
                    end_time,
                    days,
                    is_active: true,
                    linked_habit_id,
                })
                .await;
            println!("Scheduled \"{title}\" ({id})");
            Ok(())
        }
        ActivityCommand::Edit {
            selector,
            title,
            description,
            color,
            start,
            end,
            days,
            active,
        } => {
            let id = resolve_activity(ledger, &selector)?;
            let mut activity = ledger
                .activity(id)
                .cloned()
                .expect("activity was just resolved");

            if let Some(title) = title {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(validation_error("Activity title can't be empty"));
                }
                activity.title = title;
            }
            if let Some(description) = description {
                activity.description = Some(description);
            }
            if let Some(color) = color {
                activity.color = color;
            }
            if let Some(start) = start {
                activity.start_time = parse_time(&start)?;
            }
            if let Some(end) = end {
                activity.end_time = parse_time(&end)?;
            }
            if activity.start_time >= activity.end_time {
                return Err(validation_error("--end must be after --start"));
            }
            if let Some(days) = days {
                activity.days = parse_days(&days)?;
            }
            if let Some(active) = active {
                activity.is_active = active;
            }

            let title = activity.title.clone();
            ledger.update_activity(activity).await;
            println!("Updated activity \"{title}\"");
            Ok(())
        }
        ActivityCommand::List => {
            for activity in ledger.activities() {
                let linked = activity
                    .linked_habit_id
                    .and_then(|id| habit_ledger.habit(id))
                    .map(|h| format!("\t🔗 {}", h.name))
                    .unwrap_or_default();
                println!(
                    "{} {}\t{} - {}\t{}{}{}",
                    color_swatch(&activity.color),
                    activity.title,
                    activity.start_time.format("%H:%M"),
                    activity.end_time.format("%H:%M"),
                    format_days(&activity.days),
                    if activity.is_active { "" } else { "\t(inactive)" },
                    linked,
                );
            }
            Ok(())
        }
        ActivityCommand::Remove { selector } => {
            let id = resolve_activity(ledger, &selector)?;
            let title = ledger
                .activity(id)
                .expect("activity was just resolved")
                .title
                .clone();
            ledger.delete_activity(id).await;
            println!("Removed activity \"{title}\"");
            Ok(())
        }
    }
}

fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M")
        .map_err(|e| validation_error(format!("Failed to parse time {input:?} as HH:MM: {e}")))
}

const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Parses "mon,wed,fri" or "1,3,5" into weekday indices with Sunday as 0. At
/// least one day is required.
fn parse_days(input: &str) -> Result<BTreeSet<u8>> {
    let mut days = BTreeSet::new();
    for token in input.split(',') {
        let token = token.trim().to_ascii_lowercase();
        if token.is_empty() {
            continue;
        }
        if let Ok(index) = token.parse::<u8>() {
            if index > 6 {
                return Err(validation_error(format!(
                    "Day index {index} is out of range, Sunday is 0 and Saturday is 6"
                )));
            }
            days.insert(index);
            continue;
        }
        match DAY_NAMES.iter().position(|name| token.starts_with(name)) {
            Some(index) => {
                days.insert(index as u8);
            }
            None => {
                return Err(validation_error(format!("Unknown day {token:?}")));
            }
        }
    }
    if days.is_empty() {
        return Err(validation_error("At least one day is required"));
    }
    Ok(days)
}

fn format_days(days: &BTreeSet<u8>) -> String {
    days.iter()
        .map(|d| {
            let mut label = DAY_NAMES[*d as usize].to_string();
            label[..1].make_ascii_uppercase();
            label
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Finds an activity by id or by case-insensitive title.
fn resolve_activity<S: CollectionStore>(
    ledger: &ActivityLedger<S>,
    selector: &str,
) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(selector) {
        if ledger.activity(id).is_some() {
            return Ok(id);
        }
        bail!("No activity with id {id}");
    }

    let matches: Vec<Uuid> = ledger
        .activities()
        .iter()
        .filter(|a| a.title.eq_ignore_ascii_case(selector))
        .map(|a| a.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No activity titled {selector:?}"),
        _ => bail!("Several activities are titled {selector:?}, use the id instead"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_parse_from_names_and_indices() {
        assert_eq!(
            parse_days("mon,wed,fri").unwrap(),
            BTreeSet::from([1, 3, 5])
        );
        assert_eq!(parse_days("0, 6").unwrap(), BTreeSet::from([0, 6]));
        assert_eq!(
            parse_days("Sunday,saturday").unwrap(),
            BTreeSet::from([0, 6])
        );
    }

    #[test]
    fn day_parsing_rejects_bad_input() {
        assert!(parse_days("").is_err());
        assert!(parse_days("7").is_err());
        assert!(parse_days("someday").is_err());
    }

    #[test]
    fn times_parse_as_hhmm() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(parse_time("9:30 PM").is_err());
    }
}
