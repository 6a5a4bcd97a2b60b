//! Session gate.
//!
//! Decides, per render, whether a visitor may see the dashboard. Nothing is
//! cached between calls; the auth provider is asked every time.

use crate::config::GateConfig;
use crate::remote::AuthProvider;
use marksync_model::User;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::form_urlencoded;

/// A navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The landing/login view, optionally carrying an error code.
    Landing {
        /// Error code shown on the landing view.
        error: Option<String>,
    },
    /// The protected dashboard.
    Dashboard,
    /// A URL outside the application (the OAuth provider).
    External(String),
}

impl Route {
    /// The landing view without an error.
    pub fn landing() -> Self {
        Route::Landing { error: None }
    }

    /// The landing view carrying `code`.
    pub fn landing_with_error(code: impl Into<String>) -> Self {
        Route::Landing {
            error: Some(code.into()),
        }
    }

    /// Renders the route as a path or URL.
    pub fn path(&self) -> String {
        match self {
            Route::Landing { error: None } => "/".to_string(),
            Route::Landing { error: Some(code) } => {
                let encoded: String = form_urlencoded::byte_serialize(code.as_bytes()).collect();
                format!("/?error={encoded}")
            }
            Route::Dashboard => "/dashboard".to_string(),
            Route::External(url) => url.clone(),
        }
    }
}

/// Outcome of guarding the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the dashboard for this user.
    Render(User),
    /// Navigate elsewhere instead.
    Redirect(Route),
}

/// Outcome of guarding the landing view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandingDecision {
    /// Render the landing view.
    Render,
    /// Navigate elsewhere instead.
    Redirect(Route),
}

/// Guards the landing and dashboard views and drives the OAuth hand-off.
#[derive(Clone)]
pub struct SessionGate {
    auth: Arc<dyn AuthProvider>,
    config: GateConfig,
}

impl SessionGate {
    /// Creates a gate over `auth`.
    pub fn new(auth: Arc<dyn AuthProvider>, config: GateConfig) -> Self {
        Self { auth, config }
    }

    /// Returns the gate configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Guards the dashboard.
    ///
    /// No session redirects to the landing view. A failing provider also
    /// redirects there, with the session error code attached.
    pub async fn guard_dashboard(&self) -> GateDecision {
        match self.auth.current_user().await {
            Ok(Some(user)) => {
                debug!(user = %user.id, "session present");
                GateDecision::Render(user)
            }
            Ok(None) => {
                debug!("no session, redirecting to landing");
                GateDecision::Redirect(Route::landing())
            }
            Err(err) => {
                warn!(%err, "session check failed");
                GateDecision::Redirect(Route::landing_with_error(
                    self.config.session_error_code.clone(),
                ))
            }
        }
    }

    /// Guards the landing view: signed-in visitors go straight to the dashboard.
    pub async fn guard_landing(&self) -> LandingDecision {
        match self.auth.current_user().await {
            Ok(Some(user)) => {
                debug!(user = %user.id, "already signed in, redirecting to dashboard");
                LandingDecision::Redirect(Route::Dashboard)
            }
            Ok(None) => LandingDecision::Render,
            Err(err) => {
                warn!(%err, "session check failed on landing view");
                LandingDecision::Render
            }
        }
    }

    /// Starts sign-in for a request served from `origin`.
    ///
    /// Returns the provider's URL, or the landing view with the OAuth error
    /// code if the provider fails or hands back an empty URL.
    pub async fn begin_sign_in(&self, origin: &str) -> Route {
        let return_url = self.config.return_url(origin);
        let result = self
            .auth
            .begin_oauth_redirect(&self.config.provider, &return_url, &self.config.query_params)
            .await;

        match result {
            Ok(url) if !url.is_empty() => {
                info!(provider = %self.config.provider, "oauth redirect issued");
                Route::External(url)
            }
            Ok(_) => {
                warn!(provider = %self.config.provider, "oauth provider returned no url");
                Route::landing_with_error(self.config.oauth_error_code.clone())
            }
            Err(err) => {
                warn!(provider = %self.config.provider, %err, "oauth hand-off failed");
                Route::landing_with_error(self.config.oauth_error_code.clone())
            }
        }
    }

    /// Signs out and returns to the landing view.
    pub async fn sign_out(&self) -> Route {
        if let Err(err) = self.auth.sign_out().await {
            warn!(%err, "sign out failed");
        } else {
            info!("signed out");
        }
        Route::landing()
    }
}
