//! Variant selectors.
//!
//! A catalog item can be sold in several configurations. The backend knows
//! five attribute kinds; a line item picks at most one option of each. Two
//! selections are the same selection only if all five slots agree, and an
//! unselected slot is always `None` - there is no second spelling of
//! "nothing selected".

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{ColorId, FlavorId, IdError, MaterialId, SizeId, WeightId};

/// One selected variant option.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantAttribute {
    Size(SizeId),
    Weight(WeightId),
    Material(MaterialId),
    Color(ColorId),
    Flavor(FlavorId),
}

/// Errors building a [`VariantSelectors`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    /// An option id is malformed.
    #[error("invalid {field} id: {source}")]
    InvalidId {
        /// Attribute kind the id was given for.
        field: &'static str,
        /// Underlying id error.
        source: IdError,
    },
}

/// Raw, unvalidated selector fields as they arrive from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawSelectors {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub flavor: Option<String>,
}

/// The full variant selection of a line item.
///
/// Stored form keeps every slot, with `null` for unselected ones. Missing
/// fields in stored data read back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSelectors {
    #[serde(default)]
    pub size: Option<SizeId>,
    #[serde(default)]
    pub weight: Option<WeightId>,
    #[serde(default)]
    pub material: Option<MaterialId>,
    #[serde(default)]
    pub color: Option<ColorId>,
    #[serde(default)]
    pub flavor: Option<FlavorId>,
}

/// Parse one optional raw slot; blank input means "not selected".
fn normalize_slot<T, F>(
    raw: Option<&str>,
    field: &'static str,
    parse: F,
) -> Result<Option<T>, VariantError>
where
    F: FnOnce(&str) -> Result<T, IdError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse(value)
            .map(Some)
            .map_err(|source| VariantError::InvalidId { field, source }),
    }
}

impl VariantSelectors {
    /// A selection with no options chosen.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Build selectors from raw request fields.
    ///
    /// Absent, empty, and whitespace-only fields all become `None`.
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::InvalidId`] if a non-blank field is not a
    /// valid id.
    pub fn normalize(raw: &RawSelectors) -> Result<Self, VariantError> {
        Ok(Self {
            size: normalize_slot(raw.size.as_deref(), "size", SizeId::parse)?,
            weight: normalize_slot(raw.weight.as_deref(), "weight", WeightId::parse)?,
            material: normalize_slot(raw.material.as_deref(), "material", MaterialId::parse)?,
            color: normalize_slot(raw.color.as_deref(), "color", ColorId::parse)?,
            flavor: normalize_slot(raw.flavor.as_deref(), "flavor", FlavorId::parse)?,
        })
    }

    /// Return a copy with one attribute set, replacing any previous option of
    /// the same kind.
    #[must_use]
    pub fn with(mut self, attribute: VariantAttribute) -> Self {
        match attribute {
            VariantAttribute::Size(id) => self.size = Some(id),
            VariantAttribute::Weight(id) => self.weight = Some(id),
            VariantAttribute::Material(id) => self.material = Some(id),
            VariantAttribute::Color(id) => self.color = Some(id),
            VariantAttribute::Flavor(id) => self.flavor = Some(id),
        }
        self
    }

    /// Whether no option is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.is_none()
            && self.weight.is_none()
            && self.material.is_none()
            && self.color.is_none()
            && self.flavor.is_none()
    }
}
