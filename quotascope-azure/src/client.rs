//! Wrapped HTTP client for the ARM endpoint.
//!
//! Adds bearer-token injection, the `api-version` query parameter, request
//! tracing, and `value`/`nextLink` list paging on top of `reqwest`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use quotascope_core::TokenProvider;

use crate::error::AzureError;

/// Default ARM endpoint.
pub const ARM_BASE: &str = "https://management.azure.com";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for Quotascope.
const USER_AGENT: &str = concat!("Quotascope/", env!("CARGO_PKG_VERSION"));

/// Paging backstop for `nextLink` chains.
const MAX_PAGES: usize = 50;

// ============================================================================
// ARM Client
// ============================================================================

/// HTTP client wrapper for ARM calls against one subscription.
#[derive(Clone)]
pub struct ArmClient {
    inner: Client,
    tokens: Arc<dyn TokenProvider>,
    base: Url,
    subscription: String,
}

impl ArmClient {
    /// Creates a client for the default ARM endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built. This should only occur if
    /// the system's TLS configuration is fundamentally broken, making
    /// network operations impossible.
    pub fn new(tokens: Arc<dyn TokenProvider>, subscription: impl Into<String>) -> Self {
        let base = Url::parse(ARM_BASE).expect("ARM base URL is valid");
        Self::with_base_url(tokens, subscription, base)
    }

    /// Creates a client against a custom endpoint (sovereign clouds, tests).
    pub fn with_base_url(
        tokens: Arc<dyn TokenProvider>,
        subscription: impl Into<String>,
        base: Url,
    ) -> Self {
        let inner = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                panic!(
                    "Failed to create HTTP client: {e}. \
                    This usually indicates a broken TLS configuration."
                )
            });

        Self {
            inner,
            tokens,
            base,
            subscription: subscription.into(),
        }
    }

    /// The subscription this client addresses.
    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    /// Builds `/subscriptions/{id}/{suffix}`.
    pub fn subscription_path(&self, suffix: &str) -> String {
        format!(
            "/subscriptions/{}/{}",
            self.subscription,
            suffix.trim_start_matches('/')
        )
    }

    fn build_url(
        &self,
        path: &str,
        api_version: &str,
        query: &[(&str, &str)],
    ) -> Result<Url, AzureError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| AzureError::InvalidUrl(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", api_version);
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn bearer(&self) -> Result<String, AzureError> {
        self.tokens
            .bearer_token()
            .await
            .map_err(|e| AzureError::Auth(e.to_string()))
    }

    async fn decode(response: reqwest::Response) -> Result<Value, AzureError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AzureError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Performs a GET request against an absolute URL (paging links).
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_url(&self, url: Url) -> Result<Value, AzureError> {
        let token = self.bearer().await?;
        debug!("GET request");
        let response = self.inner.get(url).bearer_auth(token).send().await?;
        debug!(status = %response.status(), "Response received");
        Self::decode(response).await
    }

    /// Performs a GET request against an ARM path.
    pub async fn get(
        &self,
        path: &str,
        api_version: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, AzureError> {
        let url = self.build_url(path, api_version, query)?;
        self.get_url(url).await
    }

    /// Performs a POST request with a JSON body against an ARM path.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post(
        &self,
        path: &str,
        api_version: &str,
        body: &Value,
    ) -> Result<Value, AzureError> {
        let url = self.build_url(path, api_version, &[])?;
        let token = self.bearer().await?;
        debug!("POST request");
        let response = self
            .inner
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        debug!(status = %response.status(), "Response received");
        Self::decode(response).await
    }

    /// Retrieves a paged ARM list, following `nextLink`.
    ///
    /// Stops after `max_items` entries when given, and always after
    /// [`MAX_PAGES`] pages.
    pub async fn get_list(
        &self,
        path: &str,
        api_version: &str,
        query: &[(&str, &str)],
        max_items: Option<usize>,
    ) -> Result<Vec<Value>, AzureError> {
        let mut items = Vec::new();
        let mut page = self.get(path, api_version, query).await?;

        for _ in 0..MAX_PAGES {
            if let Some(values) = page.get("value").and_then(Value::as_array) {
                items.extend(values.iter().cloned());
            }

            if max_items.is_some_and(|max| items.len() >= max) {
                items.truncate(max_items.unwrap_or(usize::MAX));
                return Ok(items);
            }

            let Some(next) = page
                .get("nextLink")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
            else {
                return Ok(items);
            };
            let url = Url::parse(next).map_err(|e| AzureError::InvalidUrl(e.to_string()))?;
            page = self.get_url(url).await?;
        }

        warn!(path, pages = MAX_PAGES, "Paging backstop reached, result truncated");
        Ok(items)
    }
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("base", &self.base.as_str())
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quotascope_core::CoreError;

    struct FixedToken;

    #[async_trait]
    impl TokenProvider for FixedToken {
        async fn bearer_token(&self) -> Result<String, CoreError> {
            Ok("token".to_string())
        }
    }

    #[test]
    fn test_subscription_path() {
        let client = ArmClient::new(Arc::new(FixedToken), "sub-1");
        assert_eq!(
            client.subscription_path("providers/Microsoft.Compute/virtualMachines"),
            "/subscriptions/sub-1/providers/Microsoft.Compute/virtualMachines"
        );
        assert_eq!(
            client.subscription_path("/providers/Microsoft.Compute/disks"),
            "/subscriptions/sub-1/providers/Microsoft.Compute/disks"
        );
    }

    #[test]
    fn test_build_url_appends_api_version() {
        let client = ArmClient::new(Arc::new(FixedToken), "sub-1");
        let url = client
            .build_url("/subscriptions/sub-1/resources", "2024-01-01", &[("$top", "5")])
            .unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("api-version=2024-01-01"));
        assert!(query.contains("%24top=5") || query.contains("$top=5"));
    }
}
