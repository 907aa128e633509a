//! Pure guest cart/wishlist logic.
//!
//! A [`GuestList`] never holds two lines with the same identity. Adding a
//! line that already exists adds to its quantity; removing either decrements
//! or drops matching lines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::identity::{LineFilter, find_line};
use super::line_item::{LineItem, Quantity};

/// Errors from guest list mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuestListError {
    /// Merging quantities overflowed.
    #[error("quantity for {item_id} would overflow")]
    QuantityOverflow {
        /// Item whose line overflowed.
        item_id: String,
    },
}

/// Result of a removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Lines dropped entirely.
    pub removed: usize,
    /// Lines whose quantity went down but which are still present.
    pub decremented: usize,
}

impl RemoveOutcome {
    /// Whether any line was touched.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.removed > 0 || self.decremented > 0
    }
}

/// Ordered list of distinct line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct GuestList {
    lines: Vec<LineItem>,
}

impl GuestList {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a list from possibly duplicated lines.
    ///
    /// Lines sharing an identity are folded into the first occurrence with
    /// their quantities summed (saturating at `u32::MAX`).
    #[must_use]
    pub fn from_lines(lines: Vec<LineItem>) -> Self {
        let mut merged: Vec<LineItem> = Vec::with_capacity(lines.len());
        for line in lines {
            match find_line(&merged, &line.identity()).and_then(|i| merged.get_mut(i)) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => merged.push(line),
            }
        }
        Self { lines: merged }
    }

    /// Add a line, merging into an existing line with the same identity.
    ///
    /// Returns the line as it now stands in the list.
    ///
    /// # Errors
    ///
    /// Returns [`GuestListError::QuantityOverflow`] if the merged quantity
    /// does not fit; the list is left unchanged.
    pub fn add(&mut self, item: LineItem) -> Result<LineItem, GuestListError> {
        match find_line(&self.lines, &item.identity()).and_then(|i| self.lines.get_mut(i)) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .map_err(|_| GuestListError::QuantityOverflow {
                        item_id: item.item_id.to_string(),
                    })?;
                Ok(existing.clone())
            }
            None => {
                self.lines.push(item.clone());
                Ok(item)
            }
        }
    }

    /// Remove matching lines.
    ///
    /// With `count`, each matching line loses `count` units and is dropped if
    /// nothing remains. Without `count`, each matching line is dropped.
    pub fn remove(&mut self, filter: &LineFilter, count: Option<Quantity>) -> RemoveOutcome {
        let mut outcome = RemoveOutcome::default();
        self.lines.retain_mut(|line| {
            if !filter.matches(line) {
                return true;
            }
            match count.and_then(|count| line.quantity.checked_sub(count)) {
                Some(remaining) => {
                    line.quantity = remaining;
                    outcome.decremented += 1;
                    true
                }
                None => {
                    outcome.removed += 1;
                    false
                }
            }
        });
        outcome
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the list has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Consume the list, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<LineItem> {
        self.lines
    }
}

impl From<Vec<LineItem>> for GuestList {
    fn from(lines: Vec<LineItem>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<GuestList> for Vec<LineItem> {
    fn from(list: GuestList) -> Self {
        list.lines
    }
}
