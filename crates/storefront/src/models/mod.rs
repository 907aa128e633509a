//! Domain models for storefront.

pub mod session;

pub use session::{CurrentCustomer, CustomerToken, session_keys};
