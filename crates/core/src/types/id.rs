//! Newtype IDs for type-safe entity references.
//!
//! Shopify identifies everything with opaque global IDs
//! (`gid://shopify/ProductVariant/123`) and products additionally with a
//! URL handle. Use the `define_id!` macro to create wrappers that prevent
//! accidentally mixing identifiers from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use iradah_core::define_id;
/// define_id!(LineId);
/// define_id!(OrderId);
///
/// let line_id = LineId::new("gid://shopify/CartLine/1");
/// let order_id = OrderId::new("gid://shopify/Order/1");
///
/// // These are different types, so this won't compile:
/// // let _: LineId = order_id;
/// assert_eq!(line_id.as_str(), "gid://shopify/CartLine/1");
/// # let _ = order_id;
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
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the underlying identifier.
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

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);
define_id!(CartId);
define_id!(Handle);

impl VariantId {
    /// The trailing numeric part of a Shopify global ID, if present.
    ///
    /// `gid://shopify/ProductVariant/4242` yields `Some("4242")`.
    #[must_use]
    pub fn numeric_part(&self) -> Option<&str> {
        self.0
            .rsplit('/')
            .next()
            .filter(|tail| !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()))
    }
}
