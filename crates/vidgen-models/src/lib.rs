//! Shared data models for the vidgen backend.
//!
//! This crate provides Serde-serializable types for:
//! - Generation jobs and their lifecycle states
//! - Recurring schedules
//! - Provider model catalogs and pricing descriptors
//! - Stored provider credentials
//! - Streaming progress event schemas

pub mod alias;
pub mod catalog;
pub mod credential;
pub mod event;
pub mod job;
pub mod pricing;
pub mod schedule;

// Re-export common types
pub use alias::canonical_model_id;
pub use catalog::{ModelDescriptor, ModelKind, SizeTable};
pub use credential::Credential;
pub use event::GenerationEvent;
pub use job::{Job, JobId, JobStatus, NewJob, Provider, UnknownProvider};
pub use pricing::{cost, Pricing, ResolutionPricing};
pub use schedule::{next_run, Frequency, Schedule, ScheduleId, MAX_SCHEDULE_PROMPT_LENGTH};
