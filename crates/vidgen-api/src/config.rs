//! API configuration.

use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// SQLite database URL
    pub database_url: String,
    /// Delay between provider polls on a streaming connection
    pub poll_interval: Duration,
    /// Consecutive transient poll failures tolerated before the job is
    /// forced into terminal error
    pub max_transient_poll_failures: u32,
    /// Whether the recurring-schedule evaluator runs
    pub scheduler_enabled: bool,
    /// Delay between schedule evaluation ticks
    pub scheduler_interval: Duration,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            database_url: "sqlite://vidgen.db".to_string(),
            poll_interval: Duration::from_secs(5),
            max_transient_poll_failures: 5,
            scheduler_enabled: true,
            scheduler_interval: Duration::from_secs(60),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            poll_interval: Duration::from_secs(
                std::env::var("POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            max_transient_poll_failures: std::env::var("MAX_TRANSIENT_POLL_FAILURES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_transient_poll_failures),
            scheduler_enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.scheduler_enabled),
            scheduler_interval: Duration::from_secs(
                std::env::var("SCHEDULER_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.max_transient_poll_failures, 5);
        assert!(config.scheduler_enabled);
        assert!(!config.is_production());
    }
}
