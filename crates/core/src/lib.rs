//! Marketstall Core - Guest commerce types.
//!
//! This crate provides the types shared by the storefront and its tests:
//! - identifiers for catalog items and variant options
//! - line items and the rules that decide when two lines are the same line
//! - the pure guest cart/wishlist mutation logic
//! - the wire records sent to the backend when a guest signs in
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. Persistence and networking live in the
//! storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, variant selectors, line items, guest lists, sync records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
