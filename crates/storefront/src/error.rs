//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Responses are JSON: `{"error": "<message>"}`, with a `Retry-After` header on 429s
//! and `expectedRevision`/`actualRevision` for conflicts.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use marketstall_core::{EmailError, IdError, QuantityError, VariantError};

use crate::backend::BackendError;
use crate::guest::{GuestStoreError, StorageError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Guest list storage failed.
    #[error("Guest store error: {0}")]
    GuestStore(#[from] GuestStoreError),

    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Customer is not signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request conflicts with the current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<IdError> for AppError {
    fn from(err: IdError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<VariantError> for AppError {
    fn from(err: VariantError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<QuantityError> for AppError {
    fn from(err: QuantityError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::GuestStore(err) => match err {
                GuestStoreError::Conflict { .. } => StatusCode::CONFLICT,
                GuestStoreError::List(_) => StatusCode::BAD_REQUEST,
                GuestStoreError::Storage(StorageError::QuotaExceeded { .. }) => {
                    StatusCode::INSUFFICIENT_STORAGE
                }
                GuestStoreError::Storage(StorageError::Unavailable(_)) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                GuestStoreError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Backend(err) => match err {
                BackendError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                BackendError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error indicates a fault on our side worth reporting.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::GuestStore(err) => matches!(
                err,
                GuestStoreError::Storage(StorageError::Unavailable(_)) | GuestStoreError::Encode(_)
            ),
            Self::Backend(err) => !matches!(
                err,
                BackendError::InvalidCredentials | BackendError::RateLimited(_)
            ),
            Self::Session(_) | Self::Internal(_) => true,
            Self::Unauthorized(_) | Self::Conflict(_) | Self::BadRequest(_) => false,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            Self::GuestStore(err) => match err {
                GuestStoreError::Conflict { .. } => {
                    "The list was changed elsewhere, reload and try again".to_string()
                }
                GuestStoreError::List(e) => e.to_string(),
                GuestStoreError::Storage(StorageError::QuotaExceeded { .. }) => {
                    "The list is full".to_string()
                }
                GuestStoreError::Storage(StorageError::Unavailable(_))
                | GuestStoreError::Encode(_) => "Storage is unavailable, try again".to_string(),
            },
            Self::Backend(BackendError::InvalidCredentials) => "Invalid credentials".to_string(),
            Self::Backend(BackendError::RateLimited(_)) => {
                "Too many requests, try again later".to_string()
            }
            Self::Backend(_) => "External service error".to_string(),
            Self::Session(_) => "Session is unavailable, try again".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Unauthorized(msg) | Self::Conflict(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status();
        let mut body = json!({ "error": self.public_message() });

        if let Self::GuestStore(GuestStoreError::Conflict { expected, actual }) = &self {
            body["expectedRevision"] = json!(expected);
            body["actualRevision"] = json!(actual);
        }

        let mut response = (status, Json(body)).into_response();

        if let Self::Backend(BackendError::RateLimited(secs)) = &self
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(RETRY_AFTER, value);
        }

        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a customer ID.
///
/// Call this after successful authentication to associate errors with customers.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the customer.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for customer actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
