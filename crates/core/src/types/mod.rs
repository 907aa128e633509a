//! Core types for Marketstall.
//!
//! This module provides type-safe wrappers for the guest commerce domain.

pub mod email;
pub mod guest_list;
pub mod id;
pub mod identity;
pub mod line_item;
pub mod price;
pub mod sync;
pub mod variant;

pub use email::{Email, EmailError};
pub use guest_list::{GuestList, GuestListError, RemoveOutcome};
pub use id::*;
pub use identity::{LineFilter, LineIdentity, find_line};
pub use line_item::{ItemKind, LineItem, Quantity, QuantityError};
pub use price::{CartTotals, CurrencyCode, Price};
pub use sync::{ListKind, SyncPayload, SyncRecord};
pub use variant::{RawSelectors, VariantAttribute, VariantError, VariantSelectors};
