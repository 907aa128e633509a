//! Merge-on-login: hand a guest's cart and wishlist to the backend.
//!
//! Cart and wishlist are synced independently. A list is cleared only after
//! the backend accepted it, so a failed list stays in the session and can be
//! sent again later without re-sending the list that already went through.
//! If an accepted list cannot be cleared, its revision is recorded and later
//! merges skip that revision instead of sending it twice.

use serde::Serialize;
use tracing::instrument;

use marketstall_core::{ListKind, SyncPayload};

use crate::backend::BackendClient;
use crate::guest::{BlobStore, GuestStore};
use crate::models::CustomerToken;

/// What happened to one guest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ListMergeOutcome {
    /// Nothing to send: the list is empty or the backend already has it.
    Skipped,
    /// The backend accepted the list and the guest copy was cleared.
    Synced { lines: usize, quantity: u64 },
    /// The list was kept for a later retry.
    Failed { reason: String },
}

impl ListMergeOutcome {
    /// Whether this list still needs to be sent.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of a merge, per list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub cart: ListMergeOutcome,
    pub wishlist: ListMergeOutcome,
}

impl MergeReport {
    /// Whether both lists are fully merged (or had nothing to merge).
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !self.cart.is_failed() && !self.wishlist.is_failed()
    }
}

/// Sync both guest lists into the customer's backend lists.
///
/// Never fails as a whole; per-list failures are reported in the
/// [`MergeReport`] and leave that guest list untouched.
#[instrument(skip_all)]
pub async fn merge_guest_state<B: BlobStore>(
    backend: &BackendClient,
    token: &CustomerToken,
    cart: &GuestStore<B>,
    wishlist: &GuestStore<B>,
) -> MergeReport {
    let (cart, wishlist) = tokio::join!(
        merge_list(backend, token, cart),
        merge_list(backend, token, wishlist),
    );

    let report = MergeReport { cart, wishlist };
    if report.is_complete() {
        tracing::info!(?report, "Guest state merged");
    } else {
        tracing::warn!(?report, "Guest state merge incomplete");
    }
    report
}

async fn merge_list<B: BlobStore>(
    backend: &BackendClient,
    token: &CustomerToken,
    store: &GuestStore<B>,
) -> ListMergeOutcome {
    let list: ListKind = store.kind();

    let (snapshot, synced) = match tokio::try_join!(store.snapshot(), store.synced_revision()) {
        Ok(read) => read,
        Err(e) => {
            tracing::error!(list = list.as_str(), error = %e, "Failed to read guest list");
            return ListMergeOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    if snapshot.is_empty() {
        return ListMergeOutcome::Skipped;
    }

    if synced == Some(snapshot.revision) {
        tracing::info!(
            list = list.as_str(),
            revision = snapshot.revision,
            "Guest list already synced, retrying clear"
        );
        if let Err(e) = store.clear().await {
            tracing::warn!(list = list.as_str(), error = %e, "Guest list still not cleared");
        }
        return ListMergeOutcome::Skipped;
    }

    let payload = SyncPayload::from_lines(&snapshot.lines);
    if let Err(e) = backend.sync_guest_list(token, list, &payload).await {
        tracing::warn!(list = list.as_str(), error = %e, "Guest list sync failed");
        return ListMergeOutcome::Failed {
            reason: e.to_string(),
        };
    }

    if let Err(e) = store.clear().await {
        tracing::error!(
            list = list.as_str(),
            error = %e,
            "Guest list synced but could not be cleared"
        );
        if let Err(e) = store.mark_synced(snapshot.revision).await {
            tracing::error!(
                list = list.as_str(),
                error = %e,
                "Could not record synced revision; a retry will resend the list"
            );
        }
    }

    ListMergeOutcome::Synced {
        lines: payload.items.len(),
        quantity: payload.total_quantity(),
    }
}
