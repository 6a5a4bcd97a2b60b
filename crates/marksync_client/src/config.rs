//! Configuration for the client.

use std::time::Duration;

/// Configuration for a mounted bookmark controller.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long the live indicator stays lit after a feed event.
    pub live_indicator_ttl: Duration,
    /// Name of the change feed channel the controller subscribes on.
    pub channel_name: String,
}

impl ClientConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            live_indicator_ttl: Duration::from_millis(1500),
            channel_name: "bookmarks-realtime".into(),
        }
    }

    /// Sets the live indicator duration.
    pub fn with_live_indicator_ttl(mut self, ttl: Duration) -> Self {
        self.live_indicator_ttl = ttl;
        self
    }

    /// Sets the change feed channel name.
    pub fn with_channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = name.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the session gate and OAuth hand-off.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// OAuth provider name passed to the auth provider.
    pub provider: String,
    /// Path the provider redirects back to, appended to the request origin.
    pub callback_path: String,
    /// Extra query parameters sent with the OAuth request.
    pub query_params: Vec<(String, String)>,
    /// Error code attached to the landing route when the OAuth hand-off fails.
    pub oauth_error_code: String,
    /// Error code attached to the landing route when the session check fails.
    pub session_error_code: String,
}

impl GateConfig {
    /// Creates a configuration for the given OAuth provider.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            callback_path: "/auth/callback".into(),
            query_params: vec![
                ("access_type".into(), "offline".into()),
                ("prompt".into(), "consent".into()),
            ],
            oauth_error_code: "oauth_error".into(),
            session_error_code: "session_error".into(),
        }
    }

    /// Sets the callback path.
    pub fn with_callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = path.into();
        self
    }

    /// Replaces the OAuth query parameters.
    pub fn with_query_params(mut self, params: Vec<(String, String)>) -> Self {
        self.query_params = params;
        self
    }

    /// Builds the return URL for a request served from `origin`.
    pub fn return_url(&self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.callback_path)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new("google")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.live_indicator_ttl, Duration::from_millis(1500));
        assert_eq!(config.channel_name, "bookmarks-realtime");
    }

    #[test]
    fn client_config_builder() {
        let config = ClientConfig::new()
            .with_live_indicator_ttl(Duration::from_secs(3))
            .with_channel_name("tab-2");
        assert_eq!(config.live_indicator_ttl, Duration::from_secs(3));
        assert_eq!(config.channel_name, "tab-2");
    }

    #[test]
    fn gate_config_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.provider, "google");
        assert_eq!(config.oauth_error_code, "oauth_error");
        assert!(config
            .query_params
            .contains(&("prompt".to_string(), "consent".to_string())));
    }

    #[test]
    fn return_url_joins_origin_and_callback() {
        let config = GateConfig::default();
        assert_eq!(
            config.return_url("https://marks.example.com/"),
            "https://marks.example.com/auth/callback"
        );
        let custom = GateConfig::new("github").with_callback_path("/cb");
        assert_eq!(custom.return_url("http://localhost:3000"), "http://localhost:3000/cb");
    }
}
