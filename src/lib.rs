//! Habit and weekly-planner tracker for the terminal. Habits are checked off
//! per calendar day, planner activities recur on chosen weekdays and can be
//! linked to a habit, and streaks and weekly balances are derived from the
//! stored collections on every read.
//!

pub mod cli;
pub mod ledger;
pub mod stats;
pub mod store;
pub mod utils;
