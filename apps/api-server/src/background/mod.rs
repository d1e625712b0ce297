//! Background jobs.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig, VIEW_PURGE_SCHEDULE};
