//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different resource types. IDs are opaque,
//! server-assigned strings.

use core::fmt;
use core::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Behaviour shared by every resource ID type.
///
/// Implemented by [`define_id!`]; generic code (services, query keys) only
/// relies on this trait.
pub trait Identifier:
    Clone
    + fmt::Debug
    + fmt::Display
    + Eq
    + Hash
    + AsRef<str>
    + From<String>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Generate a fresh, unique ID.
    fn generate() -> Self;

    /// Get the ID as a string slice.
    fn as_str(&self) -> &str;

    /// Whether the ID is empty (an unset selection).
    fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `From<String>`, `From<&str>` and `AsRef<str>` implementations
/// - an [`Identifier`] implementation generating UUID v4 strings
///
/// # Example
///
/// ```rust
/// # use project_tracker_core::{define_id, Identifier};
/// define_id!(WidgetId);
/// define_id!(GadgetId);
///
/// let widget = WidgetId::new("1");
/// let gadget = GadgetId::new("1");
/// assert_eq!(widget.as_str(), gadget.as_str());
///
/// // These are different types, so this won't compile:
/// // let _: WidgetId = gadget;
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

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl $crate::Identifier for $name {
            fn generate() -> Self {
                Self($crate::__private::Uuid::new_v4().to_string())
            }

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
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
    };
}

define_id!(LineId);
define_id!(DealerId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = LineId::generate();
        let b = LineId::generate();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_empty_id() {
        assert!(DealerId::new("").is_empty());
        assert!(!DealerId::new("1").is_empty());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = LineId::new("42");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"42\"");

        let parsed: LineId = serde_json::from_str("\"42\"").expect("deserialize");
        assert_eq!(parsed, id);
        assert_eq!(parsed.to_string(), "42");
    }
}
