//! Commerce backend API client.
//!
//! # Architecture
//!
//! - The backend owns all persistent business data (customers, carts,
//!   prices). The storefront only holds guest lists until sign-in.
//! - JSON over HTTP with `reqwest`, relative to `BACKEND_API_URL`
//! - In-memory caching of computed totals via `moka`
//!
//! # Endpoints
//!
//! ```text
//! POST auth/login       email + password -> token + customer
//! POST cart/sync        merge guest cart records into the customer's cart
//! POST wishlist/sync    merge guest wishlist records into the customer's wishlist
//! POST cart/totals      subtotal, discount, tax, shipping and total for records
//! ```

mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{BackendCustomer, LoginResponse};

use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    /// Sign-in credentials were rejected.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The customer token was rejected.
    #[error("Backend rejected the customer token")]
    Unauthorized,

    /// Endpoint or resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the response body.
        message: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    use std::time::Duration;

    use axum::Router;
    use secrecy::SecretString;

    use super::BackendClient;
    use crate::config::{BackendConfig, parse_base_url};

    /// Serve `router` on an ephemeral port and return a client for it.
    ///
    /// The client's base URL is `http://<addr>/api/`.
    pub async fn client_for(router: Router) -> BackendClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        BackendClient::new(&BackendConfig {
            base_url: parse_base_url(&format!("http://{addr}/api")).unwrap(),
            service_token: Some(SecretString::from("svc_token")),
            timeout: Duration::from_secs(5),
            totals_cache_ttl: Duration::from_secs(60),
        })
        .unwrap()
    }
}
