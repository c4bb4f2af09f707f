//! Long-lived services behind the HTTP surface.

pub mod poller;
pub mod scheduler;
pub mod submission;

pub use scheduler::ScheduleEvaluator;
