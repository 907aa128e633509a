//! Persistent guest cart and wishlist.
//!
//! Each list lives under its own key as one JSON document:
//!
//! ```json
//! {"revision": 3, "lines": [{"itemId": "P1", "kind": "product", "quantity": 2, "selectors": {...}}]}
//! ```
//!
//! Every mutation reads the whole document, applies the change, bumps the
//! revision and writes the whole document back. Callers that pass an
//! expected revision get a conflict instead of silently overwriting a change
//! made by another tab.
//!
//! A second key per list holds the revision the backend already accepted,
//! written only when a synced list could not be cleared. A new document
//! (revision 0) drops that marker before it is first saved.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use marketstall_core::{
    GuestList, GuestListError, LineFilter, LineItem, ListKind, Quantity, RemoveOutcome,
};

use super::blob::{BlobStore, StorageError};

/// Errors from guest store operations.
#[derive(Debug, Error)]
pub enum GuestStoreError {
    /// The underlying blob store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The list was changed since the caller last read it.
    #[error("guest list changed (expected revision {expected}, found {actual})")]
    Conflict {
        /// Revision the caller based its change on.
        expected: u64,
        /// Revision currently stored.
        actual: u64,
    },

    /// The change itself was invalid.
    #[error(transparent)]
    List(#[from] GuestListError),

    /// The document could not be serialized.
    #[error("failed to encode guest list: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A point-in-time view of a guest list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSnapshot {
    pub revision: u64,
    pub lines: Vec<LineItem>,
    pub total_quantity: u64,
}

impl GuestSnapshot {
    fn from_document(document: &StoredDocument) -> Self {
        Self {
            revision: document.revision,
            lines: document.lines.lines().to_vec(),
            total_quantity: document.lines.total_quantity(),
        }
    }

    /// Whether the list has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Result of [`GuestStore::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddResult {
    /// The line as it now stands in the list.
    pub line: LineItem,
    pub snapshot: GuestSnapshot,
}

/// Result of [`GuestStore::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveResult {
    pub outcome: RemoveOutcome,
    pub snapshot: GuestSnapshot,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredDocument {
    revision: u64,
    lines: GuestList,
}

/// One guest list (cart or wishlist) over a [`BlobStore`].
#[derive(Debug, Clone)]
pub struct GuestStore<B> {
    blob: B,
    kind: ListKind,
}

impl<B: BlobStore> GuestStore<B> {
    /// Bind a store to one list kind.
    pub const fn new(blob: B, kind: ListKind) -> Self {
        Self { blob, kind }
    }

    /// Which list this store holds.
    pub const fn kind(&self) -> ListKind {
        self.kind
    }

    /// Current lines, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob store cannot be read.
    pub async fn list(&self) -> Result<Vec<LineItem>, GuestStoreError> {
        Ok(self.load().await?.lines.into_lines())
    }

    /// Current lines together with the revision they were read at.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob store cannot be read.
    pub async fn snapshot(&self) -> Result<GuestSnapshot, GuestStoreError> {
        Ok(GuestSnapshot::from_document(&self.load().await?))
    }

    /// Add a line, merging it into an existing line with the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`GuestStoreError::Conflict`] if `expected_revision` is given
    /// and stale, [`GuestStoreError::List`] on quantity overflow, or a
    /// storage error. Nothing is written on error.
    #[instrument(skip(self, item), fields(list = self.kind.as_str(), item_id = %item.item_id))]
    pub async fn add(
        &self,
        item: LineItem,
        expected_revision: Option<u64>,
    ) -> Result<AddResult, GuestStoreError> {
        let mut document = self.load_expecting(expected_revision).await?;
        let line = document.lines.add(item)?;
        self.save(&mut document).await?;

        Ok(AddResult {
            line,
            snapshot: GuestSnapshot::from_document(&document),
        })
    }

    /// Remove or decrement the lines selected by `filter`.
    ///
    /// With `count`, each matching line loses that many units and is dropped
    /// once nothing would remain. Without `count`, matching lines are
    /// dropped outright. A removal that matches nothing writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GuestStoreError::Conflict`] if `expected_revision` is given
    /// and stale, or a storage error.
    #[instrument(skip(self, filter), fields(list = self.kind.as_str(), item_id = %filter.item_id))]
    pub async fn remove(
        &self,
        filter: &LineFilter,
        count: Option<Quantity>,
        expected_revision: Option<u64>,
    ) -> Result<RemoveResult, GuestStoreError> {
        let mut document = self.load_expecting(expected_revision).await?;
        let outcome = document.lines.remove(filter, count);
        if outcome.changed() {
            self.save(&mut document).await?;
        }

        Ok(RemoveResult {
            outcome,
            snapshot: GuestSnapshot::from_document(&document),
        })
    }

    /// Delete the stored list entirely, along with its synced marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob store rejects the removal.
    #[instrument(skip(self), fields(list = self.kind.as_str()))]
    pub async fn clear(&self) -> Result<(), GuestStoreError> {
        self.blob.remove(self.kind.storage_key()).await?;
        self.blob.remove(self.kind.synced_key()).await?;
        Ok(())
    }

    /// Record that the backend accepted the list at `revision`.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob store rejects the write.
    #[instrument(skip(self), fields(list = self.kind.as_str()))]
    pub async fn mark_synced(&self, revision: u64) -> Result<(), GuestStoreError> {
        self.blob
            .set(self.kind.synced_key(), revision.to_string())
            .await?;
        Ok(())
    }

    /// Revision the backend already accepted, if one is recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob store cannot be read.
    pub async fn synced_revision(&self) -> Result<Option<u64>, GuestStoreError> {
        let Some(raw) = self.blob.get(self.kind.synced_key()).await? else {
            return Ok(None);
        };

        match raw.parse::<u64>() {
            Ok(revision) => Ok(Some(revision)),
            Err(e) => {
                tracing::warn!(
                    list = self.kind.as_str(),
                    error = %e,
                    "Ignoring unreadable synced marker"
                );
                Ok(None)
            }
        }
    }

    async fn load(&self) -> Result<StoredDocument, GuestStoreError> {
        let Some(raw) = self.blob.get(self.kind.storage_key()).await? else {
            return Ok(StoredDocument::default());
        };

        match serde_json::from_str::<StoredDocument>(&raw) {
            Ok(document) => Ok(document),
            Err(e) => {
                tracing::warn!(
                    list = self.kind.as_str(),
                    error = %e,
                    "Discarding unreadable guest list"
                );
                Ok(StoredDocument::default())
            }
        }
    }

    async fn load_expecting(
        &self,
        expected_revision: Option<u64>,
    ) -> Result<StoredDocument, GuestStoreError> {
        let document = self.load().await?;
        match expected_revision {
            Some(expected) if expected != document.revision => Err(GuestStoreError::Conflict {
                expected,
                actual: document.revision,
            }),
            _ => Ok(document),
        }
    }

    async fn save(&self, document: &mut StoredDocument) -> Result<(), GuestStoreError> {
        // Revisions restart with a new document; an old marker could match
        if document.revision == 0 {
            self.blob.remove(self.kind.synced_key()).await?;
        }

        document.revision = document.revision.saturating_add(1);
        let encoded = serde_json::to_string(document)?;
        if let Err(e) = self.blob.set(self.kind.storage_key(), encoded).await {
            document.revision = document.revision.saturating_sub(1);
            return Err(e.into());
        }
        Ok(())
    }
}
