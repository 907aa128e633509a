//! Request and response bodies of the commerce backend API.

use serde::{Deserialize, Serialize};

use marketstall_core::{CustomerId, Email};

use crate::models::CustomerToken;

/// Body of `POST auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: CustomerToken,
    pub customer: BackendCustomer,
}

/// Customer record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendCustomer {
    pub id: CustomerId,
    pub email: Email,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl BackendCustomer {
    /// "First Last", or whichever part is present.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
            (None, None) => None,
        }
    }
}

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
