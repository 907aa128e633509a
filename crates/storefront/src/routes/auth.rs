//! Authentication route handlers.
//!
//! Sign-in is delegated to the backend. A successful sign-in immediately
//! merges the guest cart and wishlist into the customer's backend lists and
//! reports the outcome per list; the response is sent only after the merge
//! finished.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::{Email, ListKind};

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, set_current_customer};
use crate::models::CurrentCustomer;
use crate::services::{MergeReport, merge_guest_state};
use crate::state::AppState;

/// Sign-in request body.
///
/// Implements `Debug` manually to redact the password.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Sign-in response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub customer: CurrentCustomer,
    pub merge: MergeReport,
}

/// Sign in with email and password, then merge the guest lists.
///
/// The merge never fails the sign-in: lists the backend did not accept stay
/// in the session and can be retried with `POST /account/merge-guest`.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let email = Email::parse(&request.email)?;
    if request.password.is_empty() {
        return Err(AppError::BadRequest("password is required".to_string()));
    }

    let login = state
        .backend()
        .login(email.as_str(), &request.password)
        .await?;

    // New session ID on privilege change; the guest lists carry over.
    session.cycle_id().await?;

    let customer = CurrentCustomer {
        id: login.customer.id.clone(),
        email: login.customer.email.clone(),
        name: login.customer.display_name(),
        signed_in_at: Utc::now(),
    };
    set_current_customer(&session, &customer, &login.token).await?;

    set_sentry_user(&customer.id, Some(customer.email.as_str()));
    add_breadcrumb("auth", "Signed in", None);
    tracing::info!(customer_id = %customer.id, "Customer signed in");

    let merge = merge_guest_state(
        state.backend(),
        &login.token,
        &state.guest_store(&session, ListKind::Cart),
        &state.guest_store(&session, ListKind::Wishlist),
    )
    .await;

    Ok(Json(LoginResponse { customer, merge }))
}

/// Sign out.
///
/// Flushes the whole session: customer, token and any leftover guest lists.
#[instrument(skip_all)]
pub async fn logout(session: Session, OptionalAuth(customer): OptionalAuth) -> Result<StatusCode> {
    session.flush().await?;
    clear_sentry_user();

    if let Some(customer) = customer {
        tracing::info!(customer_id = %customer.id, "Customer signed out");
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_debug_hides_password() {
        let request = LoginRequest {
            email: "a@b.c".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{request:?}");
        assert!(debug.contains("a@b.c"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_logout_span_omits_customer() {
        let customer = crate::routes::recorded_spans::customer();
        let spans = crate::routes::recorded_spans::capture(async {
            let session = Session::new(
                None,
                std::sync::Arc::new(tower_sessions::MemoryStore::default()),
                None,
            );
            let status = logout(session, OptionalAuth(Some(customer))).await;
            assert!(matches!(status, Ok(StatusCode::NO_CONTENT)));
        });

        assert!(spans.contains("logout"));
        assert!(!spans.contains("shopper@example.com"));
    }
}
