//! Session holder and OAuth hand-off for the reference backend.
//!
//! The OAuth redirect carries a `state` parameter signed with HMAC-SHA256 so
//! the callback can check it was issued here, for this provider and return
//! URL, and recently.
//!
//! ## Token Format
//!
//! - 8 bytes: issue time (Unix millis, big-endian)
//! - 32 bytes: HMAC-SHA256 over provider, return URL, and issue time
//!
//! Total: 40 bytes, base64url-encoded (no padding) for transport.

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use marksync_client::{AuthError, AuthProvider, AuthResult};
use marksync_model::User;
use parking_lot::{Mutex, RwLock};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_LEN: usize = 40;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Issues and verifies signed OAuth state tokens.
#[derive(Clone)]
pub struct StateTokens {
    secret: Vec<u8>,
    expiry: Duration,
}

impl StateTokens {
    /// Creates a token signer.
    pub fn new(secret: Vec<u8>, expiry: Duration) -> Self {
        Self { secret, expiry }
    }

    /// Issues a token binding `provider` and `return_url`.
    pub fn issue(&self, provider: &str, return_url: &str) -> BackendResult<String> {
        self.issue_at(provider, return_url, now_millis())
    }

    fn issue_at(&self, provider: &str, return_url: &str, issued_at: u64) -> BackendResult<String> {
        let mac = self.mac(provider, return_url, issued_at)?;

        let mut token = Vec::with_capacity(TOKEN_LEN);
        token.extend_from_slice(&issued_at.to_be_bytes());
        token.extend_from_slice(&mac.finalize().into_bytes());
        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    /// Verifies a token for `provider` and `return_url`.
    pub fn verify(&self, token: &str, provider: &str, return_url: &str) -> BackendResult<()> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| BackendError::InvalidToken("not base64url".into()))?;
        if bytes.len() != TOKEN_LEN {
            return Err(BackendError::InvalidToken("invalid token length".into()));
        }

        let (time_bytes, signature) = bytes.split_at(8);
        let mut issued = [0u8; 8];
        issued.copy_from_slice(time_bytes);
        let issued_at = u64::from_be_bytes(issued);

        self.mac(provider, return_url, issued_at)?
            .verify_slice(signature)
            .map_err(|_| BackendError::InvalidToken("invalid signature".into()))?;

        let expiry_millis = self.expiry.as_millis() as u64;
        if now_millis() > issued_at.saturating_add(expiry_millis) {
            return Err(BackendError::TokenExpired);
        }
        Ok(())
    }

    fn mac(&self, provider: &str, return_url: &str, issued_at: u64) -> BackendResult<HmacSha256> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| BackendError::InvalidKey)?;
        mac.update(provider.as_bytes());
        mac.update(&[0]);
        mac.update(return_url.as_bytes());
        mac.update(&[0]);
        mac.update(&issued_at.to_be_bytes());
        Ok(mac)
    }
}

/// Auth provider holding at most one signed-in user.
pub struct MemoryAuthProvider {
    endpoint: String,
    providers: Vec<String>,
    tokens: StateTokens,
    user: RwLock<Option<User>>,
    fail_next_user: Mutex<Option<String>>,
}

impl MemoryAuthProvider {
    /// Creates a provider with nobody signed in.
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            endpoint: config.authorize_endpoint.clone(),
            providers: config.providers.clone(),
            tokens: StateTokens::new(config.state_secret.clone(), config.state_expiry),
            user: RwLock::new(None),
            fail_next_user: Mutex::new(None),
        }
    }

    /// Establishes a session for `user`, as a completed OAuth callback would.
    pub fn sign_in_as(&self, user: User) {
        info!(user = %user.id, "session established");
        *self.user.write() = Some(user);
    }

    /// Makes the next `current_user` call fail with `message`.
    pub fn fail_next_current_user(&self, message: impl Into<String>) {
        *self.fail_next_user.lock() = Some(message.into());
    }

    /// Verifies the `state` parameter returned to the callback.
    pub fn verify_state(&self, state: &str, provider: &str, return_url: &str) -> BackendResult<()> {
        self.tokens.verify(state, provider, return_url)
    }

    fn build_redirect(
        &self,
        provider: &str,
        return_url: &str,
        params: &[(String, String)],
    ) -> BackendResult<String> {
        if !self.providers.iter().any(|p| p == provider) {
            return Err(BackendError::UnknownProvider(provider.to_string()));
        }
        let state = self.tokens.issue(provider, return_url)?;

        let mut url = Url::parse(&self.endpoint)
            .map_err(|_| BackendError::InvalidEndpoint(self.endpoint.clone()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider);
            query.append_pair("redirect_to", return_url);
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("state", &state);
        }
        Ok(url.into())
    }
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new(&BackendConfig::default())
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn current_user(&self) -> AuthResult<Option<User>> {
        if let Some(message) = self.fail_next_user.lock().take() {
            return Err(AuthError::Provider(message));
        }
        Ok(self.user.read().clone())
    }

    async fn begin_oauth_redirect(
        &self,
        provider: &str,
        return_url: &str,
        params: &[(String, String)],
    ) -> AuthResult<String> {
        let url = self.build_redirect(provider, return_url, params)?;
        debug!(provider, return_url, "oauth redirect built");
        Ok(url)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        if let Some(user) = self.user.write().take() {
            info!(user = %user.id, "session ended");
        }
        Ok(())
    }
}
