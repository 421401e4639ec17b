//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use chrono::{DateTime, Utc};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use vitrine_core::define_id;
/// define_id!(ColorId);
/// define_id!(SizeId);
///
/// let color = ColorId::new("color-1");
/// let size = SizeId::new("color-1");
///
/// // These are different types, so this won't compile:
/// // let _: ColorId = size;
/// assert_eq!(color.as_str(), size.as_str());
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
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(CartItemId);
define_id!(ProductId);
define_id!(VariantId);

impl CartItemId {
    /// Generate a fresh line-item ID.
    ///
    /// The ID has the form `item-<epoch-ms>-<8 hex chars>`. The timestamp
    /// keeps IDs readable in storage dumps; the random suffix keeps two items
    /// added in the same millisecond distinct.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let short = suffix.get(..8).unwrap_or(&suffix);
        Self(format!("item-{}-{short}", now.timestamp_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_has_item_prefix_and_timestamp() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap_or_default();
        let id = CartItemId::generate(now);
        assert!(id.as_str().starts_with("item-1700000000000-"));
        assert_eq!(id.as_str().len(), "item-1700000000000-".len() + 8);
    }

    #[test]
    fn test_generate_is_unique_within_same_millisecond() {
        let now = Utc::now();
        let a = CartItemId::generate(now);
        let b = CartItemId::generate(now);
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_transparent() {
        let id = VariantId::new("color-2");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"color-2\"");
    }
}
