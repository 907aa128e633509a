//! Guest cart and wishlist persistence.
//!
//! Guests have no account, so their lists live in their own session until
//! they sign in and the lists are merged into the backend.

mod blob;
mod store;

pub use blob::{BlobStore, MemoryBlobStore, SessionBlobStore, StorageError};
pub use store::{AddResult, GuestSnapshot, GuestStore, GuestStoreError, RemoveResult};
