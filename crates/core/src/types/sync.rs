//! Wire records for syncing guest lists to the backend at sign-in.
//!
//! Stored lines keep unselected variant slots as `null`; the backend sync
//! endpoints expect unselected slots to be left out entirely.

use serde::Serialize;

use super::id::{ColorId, FlavorId, ItemId, MaterialId, SizeId, WeightId};
use super::line_item::{ItemKind, LineItem};

/// Which guest list a store or sync call is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Cart,
    Wishlist,
}

impl ListKind {
    /// Key the list is persisted under in the guest's session.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Cart => "guest_cart",
            Self::Wishlist => "guest_wishlist",
        }
    }

    /// Key recording the revision the backend already accepted, kept only
    /// while the synced list could not be cleared.
    #[must_use]
    pub const fn synced_key(self) -> &'static str {
        match self {
            Self::Cart => "guest_cart_synced",
            Self::Wishlist => "guest_wishlist_synced",
        }
    }

    /// Backend path (relative to the API base URL) of the bulk-sync endpoint.
    #[must_use]
    pub const fn sync_path(self) -> &'static str {
        match self {
            Self::Cart => "cart/sync",
            Self::Wishlist => "wishlist/sync",
        }
    }

    /// Human-readable name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
        }
    }
}

/// One line in backend sync shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    pub content_type: ItemKind,
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_id: Option<SizeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_id: Option<WeightId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_id: Option<MaterialId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<ColorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<FlavorId>,
}

impl From<&LineItem> for SyncRecord {
    fn from(line: &LineItem) -> Self {
        let selectors = line.selectors.clone();
        Self {
            content_type: line.kind,
            item_id: line.item_id.clone(),
            quantity: line.quantity.get(),
            size_id: selectors.size,
            weight_id: selectors.weight,
            material_id: selectors.material,
            color_id: selectors.color,
            flavor_id: selectors.flavor,
        }
    }
}

/// Request body of the bulk-sync and totals endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPayload {
    pub items: Vec<SyncRecord>,
}

impl SyncPayload {
    /// Convert stored lines into sync shape, preserving order.
    #[must_use]
    pub fn from_lines(lines: &[LineItem]) -> Self {
        Self {
            items: lines.iter().map(SyncRecord::from).collect(),
        }
    }

    /// Whether there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of record quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|r| u64::from(r.quantity)).sum()
    }
}
