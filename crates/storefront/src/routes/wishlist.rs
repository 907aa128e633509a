//! Guest wishlist route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use marketstall_core::ListKind;

use super::guest::{self, AddRequest, AddResponse, CountResponse, RemoveRequest, RemoveResponse};
use crate::error::Result;
use crate::guest::GuestSnapshot;
use crate::middleware::RequireGuest;
use crate::state::AppState;

#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
) -> Result<Json<GuestSnapshot>> {
    guest::show(&state, &session, ListKind::Wishlist).await
}

#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
    Json(request): Json<AddRequest>,
) -> Result<Json<AddResponse>> {
    guest::add(&state, &session, ListKind::Wishlist, request).await
}

#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
    Json(request): Json<RemoveRequest>,
) -> Result<Json<RemoveResponse>> {
    guest::remove(&state, &session, ListKind::Wishlist, request).await
}

#[instrument(skip(state, session))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
) -> Result<StatusCode> {
    guest::clear(&state, &session, ListKind::Wishlist).await
}

#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    _guest: RequireGuest,
) -> Result<Json<CountResponse>> {
    guest::count(&state, &session, ListKind::Wishlist).await
}
