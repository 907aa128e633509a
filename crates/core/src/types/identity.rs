//! Line identity and lookup.
//!
//! Two line items are the same line if and only if item id, item kind and
//! all five variant selectors are equal. `LineIdentity` derives its equality,
//! so adding a selector slot to [`VariantSelectors`] extends the comparison
//! automatically.

use super::id::ItemId;
use super::line_item::{ItemKind, LineItem};
use super::variant::VariantSelectors;

/// Everything that distinguishes one line from another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineIdentity {
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub selectors: VariantSelectors,
}

/// Position of the line with the given identity, if any.
#[must_use]
pub fn find_line(lines: &[LineItem], identity: &LineIdentity) -> Option<usize> {
    lines.iter().position(|line| {
        line.item_id == identity.item_id
            && line.kind == identity.kind
            && line.selectors == identity.selectors
    })
}

/// Selects lines for removal.
///
/// Without selectors, every variant of the item matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFilter {
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub selectors: Option<VariantSelectors>,
}

impl LineFilter {
    /// Match every variant of an item.
    #[must_use]
    pub const fn any_variant(item_id: ItemId, kind: ItemKind) -> Self {
        Self {
            item_id,
            kind,
            selectors: None,
        }
    }

    /// Match exactly one identity.
    #[must_use]
    pub fn exact(identity: LineIdentity) -> Self {
        Self {
            item_id: identity.item_id,
            kind: identity.kind,
            selectors: Some(identity.selectors),
        }
    }

    /// Whether the line is selected by this filter.
    #[must_use]
    pub fn matches(&self, line: &LineItem) -> bool {
        line.item_id == self.item_id
            && line.kind == self.kind
            && self
                .selectors
                .as_ref()
                .is_none_or(|selectors| *selectors == line.selectors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::id::{ColorId, SizeId};
    use crate::types::line_item::Quantity;
    use crate::types::variant::VariantAttribute;

    fn line(item: &str, kind: ItemKind, size: Option<&str>) -> LineItem {
        let selectors = size.map_or_else(VariantSelectors::none, |s| {
            VariantSelectors::none().with(VariantAttribute::Size(SizeId::parse(s).unwrap()))
        });
        LineItem::new(ItemId::parse(item).unwrap(), kind, Quantity::ONE, selectors)
    }

    #[test]
    fn test_find_line_exact_match() {
        let lines = vec![
            line("P1", ItemKind::Product, Some("S")),
            line("P1", ItemKind::Product, Some("M")),
        ];
        let wanted = line("P1", ItemKind::Product, Some("M")).identity();
        assert_eq!(find_line(&lines, &wanted), Some(1));
    }

    #[test]
    fn test_find_line_kind_matters() {
        let lines = vec![line("X", ItemKind::Product, None)];
        let wanted = line("X", ItemKind::Course, None).identity();
        assert_eq!(find_line(&lines, &wanted), None);
    }

    #[test]
    fn test_find_line_none_differs_from_selected() {
        let lines = vec![line("P1", ItemKind::Product, None)];
        let wanted = line("P1", ItemKind::Product, Some("S")).identity();
        assert_eq!(find_line(&lines, &wanted), None);
    }

    #[test]
    fn test_find_line_single_differing_slot() {
        let mut colored = line("P1", ItemKind::Product, Some("S"));
        colored.selectors = colored
            .selectors
            .with(VariantAttribute::Color(ColorId::parse("red").unwrap()));
        let lines = vec![colored];
        let wanted = line("P1", ItemKind::Product, Some("S")).identity();
        assert_eq!(find_line(&lines, &wanted), None);
    }

    #[test]
    fn test_filter_any_variant() {
        let filter = LineFilter::any_variant(ItemId::parse("P1").unwrap(), ItemKind::Product);
        assert!(filter.matches(&line("P1", ItemKind::Product, Some("S"))));
        assert!(filter.matches(&line("P1", ItemKind::Product, None)));
        assert!(!filter.matches(&line("P2", ItemKind::Product, None)));
        assert!(!filter.matches(&line("P1", ItemKind::Course, None)));
    }

    #[test]
    fn test_filter_exact() {
        let filter = LineFilter::exact(line("P1", ItemKind::Product, Some("S")).identity());
        assert!(filter.matches(&line("P1", ItemKind::Product, Some("S"))));
        assert!(!filter.matches(&line("P1", ItemKind::Product, None)));
    }
}
