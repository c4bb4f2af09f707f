//! Rendering provider adapters for the vidgen backend.
//!
//! Each external rendering service gets one adapter implementing the
//! uniform [`ProviderAdapter`] capability set (submit / poll / catalog /
//! download). The [`ProviderRegistry`] selects adapters by provider tag and
//! resolves usable credentials from the externally-owned credential list.

pub mod adapter;
pub mod error;
pub mod openai;
pub mod registry;
pub mod wavespeed;

pub use adapter::{PollSnapshot, PollStatus, ProviderAdapter, SubmitOutcome, SubmitRequest};
pub use error::{ProviderError, ProviderResult};
pub use openai::OpenAiAdapter;
pub use registry::ProviderRegistry;
pub use wavespeed::WaveSpeedAdapter;
