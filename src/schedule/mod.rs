//! Cash flow schedules and CSV loading

mod data;
pub mod loader;

pub use data::{CashFlow, Schedule, DAYS_PER_YEAR};
pub use loader::{
    load_schedule, load_schedule_from_reader, load_schedules, load_schedules_from_reader,
};
