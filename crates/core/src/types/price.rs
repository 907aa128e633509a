//! Prices and backend-computed cart totals.
//!
//! The storefront never prices anything itself. Totals come from the
//! backend's calculator and are passed through to the client.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }
}

/// Totals for a set of lines, as computed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Price,
    pub discount: Price,
    pub tax: Price,
    pub shipping: Price,
    pub total: Price,
}

impl CartTotals {
    /// Totals of an empty cart.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        let zero = Price::zero(currency_code);
        Self {
            subtotal: zero,
            discount: zero,
            tax: zero,
            shipping: zero,
            total: zero,
        }
    }
}
