pub mod habits;
pub mod planner;
