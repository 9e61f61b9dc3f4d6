use std::fmt::Display;

use anyhow::{bail, Result};
use clap::{Subcommand, ValueEnum};
use uuid::Uuid;

use crate::{
    ledger::habits::{HabitDraft, HabitLedger},
    stats::weekly_balance,
    store::{collection_store::CollectionStore, entities::Frequency},
    utils::{
        clock::Clock,
        time::{calculate_streak, start_of_week},
    },
};

use super::{color_swatch, parse_day, validation_error};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Custom,
}

impl From<FrequencyArg> for Frequency {
    fn from(value: FrequencyArg) -> Self {
        match value {
            FrequencyArg::Daily => Self::Daily,
            FrequencyArg::Weekly => Self::Weekly,
            FrequencyArg::Custom => Self::Custom,
        }
    }
}

impl Display for FrequencyArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrequencyArg::Daily => write!(f, "daily"),
            FrequencyArg::Weekly => write!(f, "weekly"),
            FrequencyArg::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum HabitCommand {
    #[command(about = "Create a habit")]
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "#3B82F6", help = "Hex color used when rendering")]
        color: String,
        #[arg(long, value_enum, default_value_t = FrequencyArg::Daily)]
        frequency: FrequencyArg,
        #[arg(
            long = "times-per-week",
            help = "Weekly completion target between 1 and 7, required with --frequency custom"
        )]
        times_per_week: Option<u8>,
    },
    #[command(about = "Edit a habit or flip it between active and inactive")]
    Edit {
        #[arg(help = "Habit name or id")]
        selector: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long, value_enum)]
        frequency: Option<FrequencyArg>,
        #[arg(long = "times-per-week")]
        times_per_week: Option<u8>,
        #[arg(long)]
        active: Option<bool>,
    },
    #[command(about = "List habits with their streak and weekly balance")]
    List {
        #[arg(long, help = "Include inactive habits")]
        all: bool,
    },
    #[command(about = "Flip a habit's completion for a day")]
    Toggle {
        #[arg(help = "Habit name or id")]
        selector: String,
        #[arg(
            long,
            help = "Day to flip. Examples are \"yesterday\", \"2 days ago\", \"15/03/2025\". Defaults to today"
        )]
        date: Option<String>,
    },
    #[command(about = "Delete a habit and all of its completions")]
    Remove {
        #[arg(help = "Habit name or id")]
        selector: String,
    },
}

pub async fn process_habit_command<S: CollectionStore>(
    command: HabitCommand,
    ledger: &mut HabitLedger<S>,
    clock: &dyn Clock,
) -> Result<()> {
    match command {
        HabitCommand::Add {
            name,
            description,
            color,
            frequency,
            times_per_week,
        } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(validation_error("Habit name can't be empty"));
            }
            let frequency = frequency.into();
            let custom_frequency = validate_frequency(frequency, times_per_week)?;

            let id = ledger
                .add_habit(HabitDraft {
                    name: name.clone(),
                    description,
                    color,
                    frequency,
                    custom_frequency,
                    is_active: true,
                })
                .await;
            println!("Added habit \"{name}\" ({id})");
            Ok(())
        }
        HabitCommand::Edit {
            selector,
            name,
            description,
            color,
            frequency,
            times_per_week,
            active,
        } => {
            let id = resolve_habit(ledger, &selector)?;
            let mut habit = ledger.habit(id).cloned().expect("habit was just resolved");

            if let Some(name) = name {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(validation_error("Habit name can't be empty"));
                }
                habit.name = name;
            }
            if let Some(description) = description {
                habit.description = Some(description);
            }
            if let Some(color) = color {
                habit.color = color;
            }
            if let Some(frequency) = frequency {
                habit.frequency = frequency.into();
                // Leaving custom drops the stored target.
                if !matches!(habit.frequency, Frequency::Custom) {
                    habit.custom_frequency = None;
                }
            }
            if let Some(times) = times_per_week {
                habit.custom_frequency = Some(times);
            }
            habit.custom_frequency =
                validate_frequency(habit.frequency, habit.custom_frequency)?;
            if let Some(active) = active {
                habit.is_active = active;
            }

            let name = habit.name.clone();
            ledger.update_habit(habit).await;
            println!("Updated habit \"{name}\"");
            Ok(())
        }
        HabitCommand::List { all } => {
            let week_start = start_of_week(clock.today());
            for habit in ledger.habits() {
                if !all && !habit.is_active {
                    continue;
                }
                let streak = calculate_streak(ledger.completions(), habit.id, clock.today());
                let balance = weekly_balance(habit, ledger.completions(), week_start);
                println!(
                    "{} {}\t{}\tstreak {}\tweek {}/{} ({}%){}",
                    color_swatch(&habit.color),
                    habit.name,
                    frequency_label(habit),
                    streak,
                    balance.completed,
                    balance.target,
                    balance.percentage,
                    if habit.is_active { "" } else { "\t(inactive)" },
                );
            }
            Ok(())
        }
        HabitCommand::Toggle { selector, date } => {
            let id = resolve_habit(ledger, &selector)?;
            let date = match date {
                Some(raw) => parse_day(&raw)?,
                None => clock.today(),
            };

            let completed = ledger.toggle_completion(id, date).await;
            let name = &ledger.habit(id).expect("habit was just resolved").name;
            if completed {
                println!("Marked \"{name}\" done on {date}");
            } else {
                println!("Unmarked \"{name}\" on {date}");
            }
            Ok(())
        }
        HabitCommand::Remove { selector } => {
            let id = resolve_habit(ledger, &selector)?;
            let name = ledger.habit(id).expect("habit was just resolved").name.clone();
            ledger.delete_habit(id).await;
            println!("Removed habit \"{name}\" and its completions");
            Ok(())
        }
    }
}

/// `custom_frequency` is present and in [1, 7] iff the frequency is custom.
/// This is the single place the invariant is enforced; the ledger stores what
/// it is given.
fn validate_frequency(frequency: Frequency, times_per_week: Option<u8>) -> Result<Option<u8>> {
    match (frequency, times_per_week) {
        (Frequency::Custom, Some(n)) if (1..=7).contains(&n) => Ok(Some(n)),
        (Frequency::Custom, Some(_)) => Err(validation_error(
            "--times-per-week must be between 1 and 7",
        )),
        (Frequency::Custom, None) => Err(validation_error(
            "--frequency custom requires --times-per-week",
        )),
        (_, Some(_)) => Err(validation_error(
            "--times-per-week is only valid with --frequency custom",
        )),
        (_, None) => Ok(None),
    }
}

/// Finds a habit by id or by case-insensitive name.
pub(crate) fn resolve_habit<S: CollectionStore>(
    ledger: &HabitLedger<S>,
    selector: &str,
) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(selector) {
        if ledger.habit(id).is_some() {
            return Ok(id);
        }
        bail!("No habit with id {id}");
    }

    let matches: Vec<Uuid> = ledger
        .habits()
        .iter()
        .filter(|h| h.name.eq_ignore_ascii_case(selector))
        .map(|h| h.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No habit named {selector:?}"),
        _ => bail!("Several habits are named {selector:?}, use the id instead"),
    }
}

fn frequency_label(habit: &crate::store::entities::Habit) -> String {
    match habit.frequency {
        Frequency::Daily => "daily".into(),
        Frequency::Weekly => "weekly".into(),
        Frequency::Custom => format!("{}x/week", habit.weekly_target()),
    }
}
