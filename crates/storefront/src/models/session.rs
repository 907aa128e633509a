//! Session-related types.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marketstall_core::{CustomerId, Email};

/// Session-stored customer identity.
///
/// Minimal data stored in the session to identify the signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentCustomer {
    /// Backend customer ID.
    pub id: CustomerId,
    /// Customer's email address.
    pub email: Email,
    /// Display name, if the backend has one.
    #[serde(default)]
    pub name: Option<String>,
    /// When this session signed in.
    pub signed_in_at: DateTime<Utc>,
}

/// Bearer token issued by the backend at sign-in.
///
/// Implements `Debug` manually so the token never reaches logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerToken(String);

impl CustomerToken {
    /// Wrap a raw token.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CustomerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CustomerToken([REDACTED])")
    }
}

/// Session keys for authentication data.
///
/// Guest list keys come from `ListKind::storage_key`.
pub mod session_keys {
    /// Key for storing the current signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the backend bearer token.
    pub const CUSTOMER_TOKEN: &str = "customer_token";
}
