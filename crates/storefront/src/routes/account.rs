//! Account route handlers.
//!
//! These routes require authentication.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::ListKind;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, current_token};
use crate::models::CurrentCustomer;
use crate::services::merge_guest_state;
use crate::state::AppState;

/// The signed-in customer.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn index(RequireAuth(customer): RequireAuth) -> Json<CurrentCustomer> {
    Json(customer)
}

/// Retry merging whatever guest lines are still in the session.
///
/// Lists that were merged at sign-in are already cleared, so only the
/// leftovers are sent. Responds 502 with the report if a list still failed.
#[instrument(skip_all)]
pub async fn merge_guest(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<Response> {
    let token = current_token(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Sign in again".to_string()))?;

    let report = merge_guest_state(
        state.backend(),
        &token,
        &state.guest_store(&session, ListKind::Cart),
        &state.guest_store(&session, ListKind::Wishlist),
    )
    .await;
    tracing::info!(customer_id = %customer.id, complete = report.is_complete(), "Guest merge retried");

    let status = if report.is_complete() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(report)).into_response())
}
