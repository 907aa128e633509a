//! Guest cart route handlers.
//!
//! The cart lives in the visitor's session until they sign in. Totals are
//! always computed by the backend.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::{CartTotals, ListKind};

use super::guest::{self, AddRequest, AddResponse, CountResponse, RemoveRequest, RemoveResponse};
use crate::error::Result;
use crate::guest::GuestSnapshot;
use crate::middleware::RequireGuest;
use crate::state::AppState;

/// Show the guest cart.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
) -> Result<Json<GuestSnapshot>> {
    guest::show(&state, &session, ListKind::Cart).await
}

/// Add a line to the guest cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
    Json(request): Json<AddRequest>,
) -> Result<Json<AddResponse>> {
    guest::add(&state, &session, ListKind::Cart, request).await
}

/// Remove or decrement lines in the guest cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
    Json(request): Json<RemoveRequest>,
) -> Result<Json<RemoveResponse>> {
    guest::remove(&state, &session, ListKind::Cart, request).await
}

/// Empty the guest cart.
#[instrument(skip(state, session))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
) -> Result<StatusCode> {
    guest::clear(&state, &session, ListKind::Cart).await
}

/// Total number of units in the guest cart (badge count).
#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
) -> Result<Json<CountResponse>> {
    guest::count(&state, &session, ListKind::Cart).await
}

/// Backend-computed totals for the guest cart.
#[instrument(skip(state, session))]
pub async fn totals(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
) -> Result<Json<CartTotals>> {
    let lines = state.guest_store(&session, ListKind::Cart).list().await?;
    Ok(Json(state.backend().calculate_totals(&lines).await?))
}
