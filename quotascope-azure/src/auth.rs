//! Token providers for the ARM endpoint.
//!
//! Two ways to satisfy the credential contract:
//!
//! 1. **Static token** - a pre-acquired bearer token from the environment,
//!    handy for CI and short-lived sessions.
//! 2. **Client credentials** - a service principal's OAuth2
//!    client-credentials flow against the Microsoft identity platform, with
//!    in-process token caching.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use quotascope_core::{CoreError, TokenProvider};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable holding a pre-acquired bearer token.
pub const TOKEN_ENV: &str = "QUOTASCOPE_ACCESS_TOKEN";

/// Microsoft identity platform endpoint base.
const LOGIN_BASE: &str = "https://login.microsoftonline.com";

/// OAuth2 scope for the ARM endpoint.
const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// HTTP client timeout for token requests.
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Refresh tokens this long before their reported expiry.
const EXPIRY_SLACK_SECS: u64 = 60;

// ============================================================================
// Static Token Provider
// ============================================================================

/// Serves one pre-acquired bearer token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Wraps an explicit token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Reads the token from [`TOKEN_ENV`], if set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Self::new)
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, CoreError> {
        Ok(self.token.clone())
    }
}

// ============================================================================
// Client-Secret Credentials
// ============================================================================

/// Service principal credentials for the client-credentials flow.
#[derive(Debug, Clone)]
pub struct ClientSecretCredentials {
    /// Directory (tenant) id.
    pub tenant_id: String,
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
}

impl ClientSecretCredentials {
    /// Reads credentials from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, and
    /// `AZURE_CLIENT_SECRET`. Returns `None` unless all three are set.
    pub fn from_env() -> Option<Self> {
        let get = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            tenant_id: get("AZURE_TENANT_ID")?,
            client_id: get("AZURE_CLIENT_ID")?,
            client_secret: get("AZURE_CLIENT_SECRET")?,
        })
    }
}

// ============================================================================
// Client-Secret Token Provider
// ============================================================================

/// OAuth token response from the identity platform.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Token provider running the OAuth2 client-credentials flow, with caching.
pub struct ClientSecretTokenProvider {
    creds: ClientSecretCredentials,
    http: reqwest::Client,
    cache: Mutex<Option<CachedToken>>,
}

impl ClientSecretTokenProvider {
    /// Creates a provider for the given service principal.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built, which indicates a broken
    /// TLS configuration.
    pub fn new(creds: ClientSecretCredentials) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            creds,
            http,
            cache: Mutex::new(None),
        }
    }

    #[instrument(skip(self))]
    async fn request_token(&self) -> Result<CachedToken, CoreError> {
        let endpoint = format!("{LOGIN_BASE}/{}/oauth2/v2.0/token", self.creds.tenant_id);
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.creds.client_id.as_str()),
            ("client_secret", self.creds.client_secret.as_str()),
            ("scope", ARM_SCOPE),
        ];

        info!("Requesting ARM token via client credentials");

        let response = self
            .http
            .post(&endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| CoreError::AuthenticationFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::AuthenticationFailed(format!(
                "Token request failed: {status} - {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CoreError::AuthenticationFailed(e.to_string()))?;

        let lifetime = token
            .expires_in
            .unwrap_or(EXPIRY_SLACK_SECS)
            .saturating_sub(EXPIRY_SLACK_SECS);
        debug!(lifetime_secs = lifetime, "Token acquired");

        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        })
    }
}

#[async_trait]
impl TokenProvider for ClientSecretTokenProvider {
    async fn bearer_token(&self) -> Result<String, CoreError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
            debug!("Cached token expired, refreshing");
        }

        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}

// ============================================================================
// Tests
// ============================================================================
