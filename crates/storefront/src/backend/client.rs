//! HTTP client for the commerce backend.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use marketstall_core::{CartTotals, CurrencyCode, LineItem, ListKind, SyncPayload};

use super::BackendError;
use super::types::{ErrorBody, LoginRequest, LoginResponse};
use crate::config::BackendConfig;
use crate::models::CustomerToken;

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Maximum number of cached totals.
const TOTALS_CACHE_CAPACITY: u64 = 1000;

/// Client for the commerce backend API.
///
/// Cheap to clone. Totals are cached by request body for the configured TTL;
/// sign-in and sync calls are never cached.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    service_token: Option<SecretString>,
    totals: Cache<String, CartTotals>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let totals = Cache::builder()
            .max_capacity(TOTALS_CACHE_CAPACITY)
            .time_to_live(config.totals_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                service_token: config.service_token.clone(),
                totals,
            }),
        })
    }

    /// Exchange email and password for a customer token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidCredentials`] if the backend rejects
    /// the credentials, or another `BackendError` if the call fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, BackendError> {
        let body = LoginRequest { email, password };
        match self.post_json("auth/login", &body, None).await {
            Err(BackendError::Unauthorized) => Err(BackendError::InvalidCredentials),
            other => other,
        }
    }

    /// Send a guest list to the backend's bulk-sync endpoint.
    ///
    /// The backend merges the records into the customer's own list.
    ///
    /// # Errors
    ///
    /// Returns a `BackendError` if the request fails or is rejected.
    #[instrument(skip(self, token, payload), fields(list = list.as_str(), items = payload.items.len()))]
    pub async fn sync_guest_list(
        &self,
        token: &CustomerToken,
        list: ListKind,
        payload: &SyncPayload,
    ) -> Result<(), BackendError> {
        self.send(list.sync_path(), payload, Some(token)).await?;
        tracing::debug!("Guest list accepted by backend");
        Ok(())
    }

    /// Compute totals for a set of lines with the backend calculator.
    ///
    /// An empty set is priced at zero without a request.
    ///
    /// # Errors
    ///
    /// Returns a `BackendError` if the request fails or is rejected.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn calculate_totals(&self, lines: &[LineItem]) -> Result<CartTotals, BackendError> {
        if lines.is_empty() {
            return Ok(CartTotals::zero(CurrencyCode::default()));
        }

        let payload = SyncPayload::from_lines(lines);
        let cache_key = serde_json::to_string(&payload)?;

        if let Some(totals) = self.inner.totals.get(&cache_key).await {
            tracing::debug!("Totals cache hit");
            return Ok(totals);
        }

        let totals: CartTotals = self.post_json("cart/totals", &payload, None).await?;
        self.inner.totals.insert(cache_key, totals).await;
        Ok(totals)
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        token: Option<&CustomerToken>,
    ) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.send(path, body, token).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    async fn send<B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&CustomerToken>,
    ) -> Result<String, BackendError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.inner.base_url.join(path)?;
        let mut request = self.inner.client.post(url).json(body);
        if let Some(service_token) = &self.inner.service_token {
            request = request.header("X-Service-Token", service_token.expose_secret());
        }
        if let Some(token) = token {
            request = request.bearer_auth(token.expose());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(BackendError::RateLimited(retry_after));
        }

        let text = response.text().await?;
        if status.is_success() {
            return Ok(text);
        }

        tracing::warn!(
            status = %status,
            path,
            body = %text.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        Err(error_for_status(status, path, &text))
    }
}

/// Map a non-success status to a `BackendError`.
fn error_for_status(status: StatusCode, path: &str, body: &str) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        StatusCode::NOT_FOUND => BackendError::NotFound(path.to_string()),
        _ => {
            let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
            let message = parsed
                .message
                .or(parsed.error)
                .unwrap_or_else(|| body.chars().take(200).collect());
            BackendError::Status {
                status: status.as_u16(),
                message,
            }
        }
    }
}
