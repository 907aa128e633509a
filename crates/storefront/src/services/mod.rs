//! Business logic services for storefront.
//!
//! # Services
//!
//! - `merge` - Merge-on-login of guest cart and wishlist into the backend

pub mod merge;

pub use merge::{ListMergeOutcome, MergeReport, merge_guest_state};
