//! HTTP request handlers.

pub mod generations;
pub mod health;
pub mod media;
pub mod providers;
pub mod schedules;

pub use health::health;
