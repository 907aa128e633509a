//! Request handling shared by the guest cart and wishlist routes.
//!
//! Both lists accept the same bodies and return the same shapes; only the
//! session key differs.

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use marketstall_core::{
    ItemId, ItemKind, LineFilter, LineItem, ListKind, Quantity, QuantityError, RawSelectors,
    VariantSelectors,
};

use crate::error::{AppError, Result};
use crate::guest::{GuestSnapshot, GuestStore, SessionBlobStore};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

const fn default_quantity() -> i64 {
    1
}

/// Body of `POST /{list}/add`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub item_id: String,
    pub kind: ItemKind,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(flatten)]
    pub selectors: RawSelectors,
    #[serde(default)]
    pub expected_revision: Option<u64>,
}

impl AddRequest {
    fn into_line(self) -> Result<LineItem> {
        let quantity = Quantity::from_signed(self.quantity).map_err(|e| match e {
            QuantityError::NotPositive => {
                AppError::BadRequest("quantity must be at least 1".to_string())
            }
            QuantityError::Overflow => AppError::BadRequest("quantity too large".to_string()),
        })?;

        Ok(LineItem::new(
            ItemId::parse(&self.item_id)?,
            self.kind,
            quantity,
            VariantSelectors::normalize(&self.selectors)?,
        ))
    }
}

/// Body of `POST /{list}/remove`.
///
/// Without `variant`, every variant of the item is removed. Without `count`,
/// matching lines are removed outright.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub item_id: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub variant: Option<RawSelectors>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub expected_revision: Option<u64>,
}

impl RemoveRequest {
    fn filter(&self) -> Result<LineFilter> {
        Ok(LineFilter {
            item_id: ItemId::parse(&self.item_id)?,
            kind: self.kind,
            selectors: self
                .variant
                .as_ref()
                .map(VariantSelectors::normalize)
                .transpose()?,
        })
    }

    fn count(&self) -> Result<Option<Quantity>> {
        self.count
            .map(|n| {
                Quantity::from_signed(n).map_err(|_| {
                    AppError::BadRequest("count must be a positive integer".to_string())
                })
            })
            .transpose()
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Response of an add.
#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub line: LineItem,
    pub list: GuestSnapshot,
}

/// Response of a remove.
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: usize,
    pub decremented: usize,
    pub list: GuestSnapshot,
}

/// Response of a count.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

// =============================================================================
// Shared Operations
// =============================================================================

fn store(state: &AppState, session: &Session, kind: ListKind) -> GuestStore<SessionBlobStore> {
    state.guest_store(session, kind)
}

pub(super) async fn show(
    state: &AppState,
    session: &Session,
    kind: ListKind,
) -> Result<Json<GuestSnapshot>> {
    Ok(Json(store(state, session, kind).snapshot().await?))
}

pub(super) async fn add(
    state: &AppState,
    session: &Session,
    kind: ListKind,
    request: AddRequest,
) -> Result<Json<AddResponse>> {
    let expected_revision = request.expected_revision;
    let line = request.into_line()?;
    let result = store(state, session, kind)
        .add(line, expected_revision)
        .await?;

    tracing::debug!(
        list = kind.as_str(),
        quantity = %result.line.quantity,
        revision = result.snapshot.revision,
        "Guest line added"
    );

    Ok(Json(AddResponse {
        line: result.line,
        list: result.snapshot,
    }))
}

pub(super) async fn remove(
    state: &AppState,
    session: &Session,
    kind: ListKind,
    request: RemoveRequest,
) -> Result<Json<RemoveResponse>> {
    let filter = request.filter()?;
    let count = request.count()?;
    let result = store(state, session, kind)
        .remove(&filter, count, request.expected_revision)
        .await?;

    Ok(Json(RemoveResponse {
        removed: result.outcome.removed,
        decremented: result.outcome.decremented,
        list: result.snapshot,
    }))
}

pub(super) async fn clear(state: &AppState, session: &Session, kind: ListKind) -> Result<StatusCode> {
    store(state, session, kind).clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn count(
    state: &AppState,
    session: &Session,
    kind: ListKind,
) -> Result<Json<CountResponse>> {
    let snapshot = store(state, session, kind).snapshot().await?;
    Ok(Json(CountResponse {
        count: snapshot.total_quantity,
    }))
}
