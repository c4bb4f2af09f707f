//! HTTP surface and long-running services for video generation
//! orchestration.

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::ScheduleEvaluator;
pub use state::AppState;
