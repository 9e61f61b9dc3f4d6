pub mod backup;
pub mod habits;
pub mod planner;
pub mod views;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::{parse_date_string, Dialect};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    ledger::{habits::HabitLedger, planner::ActivityLedger},
    store::collection_store::FileCollectionStore,
    utils::{
        clock::{Clock, DefaultClock},
        dir::resolve_data_dir,
        logging::enable_logging,
    },
};

use self::{habits::HabitCommand, planner::ActivityCommand};

#[derive(Parser, Debug)]
#[command(name = "Habitline", version, long_about = None)]
#[command(about = "Habit and weekly-planner tracker for the terminal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(subcommand, about = "Create, edit and check off habits")]
    Habit(HabitCommand),
    #[command(subcommand, about = "Manage scheduled planner activities")]
    Activity(ActivityCommand),
    #[command(about = "Show today's schedule merged with habit completions")]
    Today,
    #[command(about = "Show the current week's completion grid and weekly balance")]
    Week,
    #[command(about = "Show streak statistics")]
    Stats,
    #[command(about = "Write all collections into a single JSON backup document")]
    Export {
        #[arg(long, help = "Output file. Defaults to habitline-backup-<date>.json")]
        out: Option<PathBuf>,
    },
    #[command(
        about = "Inspect a backup document. Merging it into live state is not supported"
    )]
    Import { file: PathBuf },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let data_dir = resolve_data_dir();
    enable_logging(&data_dir, logging_level, args.log)?;

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    // Each ledger carries its own handle onto the same directory; the files
    // they touch are disjoint.
    let mut habit_ledger = HabitLedger::load(
        FileCollectionStore::new(data_dir.clone())?,
        clock.clone(),
    )
    .await;
    let mut activity_ledger = ActivityLedger::load(
        FileCollectionStore::new(data_dir.clone())?,
        clock.clone(),
    )
    .await;

    match args.commands {
        Commands::Habit(command) => {
            habits::process_habit_command(command, &mut habit_ledger, clock.as_ref()).await
        }
        Commands::Activity(command) => {
            planner::process_activity_command(command, &mut activity_ledger, &habit_ledger).await
        }
        Commands::Today => {
            views::print_today(&habit_ledger, &activity_ledger, clock.as_ref());
            Ok(())
        }
        Commands::Week => {
            views::print_week(&habit_ledger, clock.as_ref());
            Ok(())
        }
        Commands::Stats => {
            views::print_stats(&habit_ledger, clock.as_ref());
            Ok(())
        }
        Commands::Export { out } => {
            backup::export(&habit_ledger, &activity_ledger, clock.as_ref(), out)
        }
        Commands::Import { file } => backup::import(&file),
    }
}

/// Rejection at the form boundary, surfaced as a clap validation error. These
/// never reach the ledgers and are not logged as failures.
pub(crate) fn validation_error(message: impl Into<String>) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message.into())
        .into()
}

/// Parses a human day like "yesterday", "2 days ago" or "15/03/2025".
pub(crate) fn parse_day(input: &str) -> Result<NaiveDate> {
    match parse_date_string(input, Local::now(), Dialect::Uk) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(validation_error(format!(
            "Failed to parse day {input:?}: {e}"
        ))),
    }
}

/// Terminal dot in the record's color, falling back to an uncolored dot when
/// the stored value isn't "#RRGGBB".
pub(crate) fn color_swatch(color: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => ansi_term::Colour::RGB(r, g, b).paint("●").to_string(),
        None => "●".to_string(),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let v = u32::from_str_radix(hex, 16).ok()?;
    Some(((v >> 16) as u8, (v >> 8) as u8, v as u8))
}
