//! Newtype IDs for commerce platform global IDs.
//!
//! Shopify identifies every object with an opaque global ID string such as
//! `gid://shopify/CartLine/abc123`. Use the `define_gid!` macro to create
//! type-safe wrappers that prevent accidentally mixing IDs from different
//! object types (a cart line ID is never a merchandise ID).

/// Macro to define a type-safe global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use luneva_core::define_gid;
/// define_gid!(LineId);
/// define_gid!(VariantId);
///
/// let line = LineId::new("gid://shopify/CartLine/1");
/// let variant = VariantId::new("gid://shopify/ProductVariant/1");
///
/// // These are different types, so this won't compile:
/// // let _: LineId = variant;
/// assert_eq!(line.as_str(), "gid://shopify/CartLine/1");
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the ID string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_gid!(CartId);
define_gid!(CartLineId);
define_gid!(MerchandiseId);
define_gid!(GiftCardId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_gid_display_and_accessors() {
        let id = CartLineId::new("gid://shopify/CartLine/42");
        assert_eq!(id.to_string(), "gid://shopify/CartLine/42");
        assert_eq!(id.as_str(), "gid://shopify/CartLine/42");
        assert_eq!(id.clone().into_inner(), "gid://shopify/CartLine/42");
    }

    #[test]
    fn test_gid_serde_is_transparent() {
        let id = MerchandiseId::from("gid://shopify/ProductVariant/7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gid://shopify/ProductVariant/7\"");

        let parsed: MerchandiseId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_gid_ordering_is_lexicographic() {
        let mut ids = vec![CartLineId::new("b"), CartLineId::new("a"), CartLineId::new("c")];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(CartLineId::as_str).collect();
        assert_eq!(ordered, vec!["a", "b", "c"]);
    }
}
