//! Backend configuration.

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

/// Configuration for the reference backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Secret key for signing OAuth state tokens.
    pub state_secret: Vec<u8>,
    /// How long a state token stays valid.
    pub state_expiry: Duration,
    /// OAuth authorize endpoint the redirect URL points at.
    pub authorize_endpoint: String,
    /// OAuth providers the auth provider accepts.
    pub providers: Vec<String>,
    /// Timestamp given to the first created row.
    pub clock_start: DateTime<Utc>,
    /// Gap between consecutive row timestamps.
    pub clock_step: Duration,
}

impl BackendConfig {
    /// Creates a configuration signing state tokens with `secret`.
    pub fn new(state_secret: Vec<u8>) -> Self {
        Self {
            state_secret,
            state_expiry: Duration::from_secs(10 * 60),
            authorize_endpoint: "https://auth.marksync.local/authorize".into(),
            providers: vec!["google".into()],
            clock_start: Utc.timestamp_opt(1_767_225_600, 0).single().unwrap_or_default(),
            clock_step: Duration::from_secs(1),
        }
    }

    /// Sets the state token expiry.
    pub fn with_state_expiry(mut self, expiry: Duration) -> Self {
        self.state_expiry = expiry;
        self
    }

    /// Sets the authorize endpoint.
    pub fn with_authorize_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorize_endpoint = endpoint.into();
        self
    }

    /// Adds an accepted OAuth provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.providers.push(provider.into());
        self
    }

    /// Sets the first row timestamp.
    pub fn with_clock_start(mut self, start: DateTime<Utc>) -> Self {
        self.clock_start = start;
        self
    }

    /// Sets the gap between row timestamps.
    pub fn with_clock_step(mut self, step: Duration) -> Self {
        self.clock_step = step;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(b"marksync-development-state-secret".to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.providers, vec!["google".to_string()]);
        assert_eq!(config.clock_step, Duration::from_secs(1));
        assert!(!config.state_secret.is_empty());
    }

    #[test]
    fn config_builder() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let config = BackendConfig::new(vec![7; 32])
            .with_state_expiry(Duration::from_secs(30))
            .with_provider("github")
            .with_clock_start(start)
            .with_clock_step(Duration::from_secs(60));

        assert_eq!(config.state_expiry, Duration::from_secs(30));
        assert!(config.providers.contains(&"github".to_string()));
        assert_eq!(config.clock_start, start);
        assert_eq!(config.clock_step, Duration::from_secs(60));
    }
}
