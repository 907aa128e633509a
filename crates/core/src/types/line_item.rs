//! Line items held in a guest cart or wishlist.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ItemId;
use super::identity::LineIdentity;
use super::variant::VariantSelectors;

/// What kind of catalog entry a line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Product,
    Course,
}

impl ItemKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Course => "course",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when building or combining a [`Quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// Quantities must be at least one.
    #[error("quantity must be positive")]
    NotPositive,
    /// Adding two quantities overflowed.
    #[error("quantity too large")]
    Overflow,
}

/// A positive item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(1);

    /// The largest representable quantity.
    pub const MAX: Self = Self(u32::MAX);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] for zero.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            Err(QuantityError::NotPositive)
        } else {
            Ok(Self(value))
        }
    }

    /// Create a quantity from a signed count, as sent by clients.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] for zero or negative input and
    /// [`QuantityError::Overflow`] for input beyond `u32::MAX`.
    pub fn from_signed(value: i64) -> Result<Self, QuantityError> {
        if value <= 0 {
            return Err(QuantityError::NotPositive);
        }
        u32::try_from(value)
            .map_err(|_| QuantityError::Overflow)
            .and_then(Self::new)
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Sum of two quantities.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Overflow`] if the sum does not fit in `u32`.
    pub const fn checked_add(self, other: Self) -> Result<Self, QuantityError> {
        match self.0.checked_add(other.0) {
            Some(sum) => Ok(Self(sum)),
            None => Err(QuantityError::Overflow),
        }
    }

    /// Sum of two quantities, clamped to [`Quantity::MAX`].
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Difference of two quantities, or `None` if nothing would remain.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        if other.0 >= self.0 {
            None
        } else {
            Some(Self(self.0 - other.0))
        }
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One distinct purchasable configuration plus its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub quantity: Quantity,
    #[serde(default)]
    pub selectors: VariantSelectors,
}

impl LineItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(
        item_id: ItemId,
        kind: ItemKind,
        quantity: Quantity,
        selectors: VariantSelectors,
    ) -> Self {
        Self {
            item_id,
            kind,
            quantity,
            selectors,
        }
    }

    /// The identity key of this line (everything except the quantity).
    #[must_use]
    pub fn identity(&self) -> LineIdentity {
        LineIdentity {
            item_id: self.item_id.clone(),
            kind: self.kind,
            selectors: self.selectors.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_rejects_zero() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_quantity_from_signed() {
        assert_eq!(Quantity::from_signed(-2), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::from_signed(0), Err(QuantityError::NotPositive));
        assert_eq!(
            Quantity::from_signed(i64::from(u32::MAX) + 1),
            Err(QuantityError::Overflow)
        );
        assert_eq!(Quantity::from_signed(7).unwrap().get(), 7);
    }

    #[test]
    fn test_quantity_checked_add_overflow() {
        let max = Quantity::new(u32::MAX).unwrap();
        assert_eq!(max.checked_add(Quantity::ONE), Err(QuantityError::Overflow));
    }

    #[test]
    fn test_quantity_checked_sub() {
        let five = Quantity::new(5).unwrap();
        assert_eq!(five.checked_sub(Quantity::new(2).unwrap()).unwrap().get(), 3);
        assert_eq!(five.checked_sub(five), None);
        assert_eq!(five.checked_sub(Quantity::new(9).unwrap()), None);
    }

    #[test]
    fn test_quantity_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }

    #[test]
    fn test_line_item_json_shape() {
        let line = LineItem::new(
            ItemId::parse("C7").unwrap(),
            ItemKind::Course,
            Quantity::ONE,
            VariantSelectors::none(),
        );
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["itemId"], "C7");
        assert_eq!(json["kind"], "course");
        assert_eq!(json["quantity"], 1);
        assert!(json["selectors"]["size"].is_null());
    }
}
