//! Newtype IDs for type-safe catalog references.
//!
//! Backend identifiers are opaque strings. Use the `define_id!` macro to
//! create wrappers that prevent mixing, say, a size id with a color id.

use thiserror::Error;

/// Maximum accepted length of an identifier, in bytes.
pub const MAX_ID_LENGTH: usize = 128;

/// Errors that can occur when parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input is empty or only whitespace.
    #[error("identifier cannot be empty")]
    Empty,
    /// The input is longer than [`MAX_ID_LENGTH`].
    #[error("identifier must be at most {max} bytes")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Validate and trim a raw identifier.
///
/// Used by ids generated with [`define_id!`].
///
/// # Errors
///
/// Returns an error if the input is blank or longer than [`MAX_ID_LENGTH`].
pub fn validate_id(raw: &str) -> Result<&str, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }
    if trimmed.len() > MAX_ID_LENGTH {
        return Err(IdError::TooLong { max: MAX_ID_LENGTH });
    }
    Ok(trimmed)
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a bare string, `Deserialize` through `parse`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()`, `as_str()`, `Display`, `FromStr`
///
/// # Example
///
/// ```rust
/// # use marketstall_core::define_id;
/// define_id!(ShelfId);
/// define_id!(BinId);
///
/// let shelf = ShelfId::parse("A-1").unwrap();
/// let bin = BinId::parse("A-1").unwrap();
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = bin;
/// # let _ = (shelf, bin);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is blank or too long.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                $crate::types::id::validate_id(raw).map(|s| Self(s.to_owned()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $crate::types::id::IdError;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Catalog items (products and courses share one id space on the backend)
define_id!(ItemId);

// Variant option ids
define_id!(SizeId);
define_id!(WeightId);
define_id!(MaterialId);
define_id!(ColorId);
define_id!(FlavorId);

// Accounts
define_id!(CustomerId);
