//! # Identifier Newtypes
//!
//! Domain-primitive newtypes for every identifier in the marketplace.
//! Each identifier is a distinct type — you cannot pass a [`ProductId`]
//! where a [`UserId`] is expected. All are UUID v4 under the hood and
//! therefore always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

define_id! {
    /// Unique identifier of a user account (farmer, buyer, transporter,
    /// or staff). Ownership comparisons across the marketplace are strict
    /// equality on this id — never on mutable fields like email or name.
    UserId
}

define_id! {
    /// Unique identifier of a product category.
    CategoryId
}

define_id! {
    /// Unique identifier of a listed product.
    ProductId
}

define_id! {
    /// Unique identifier of a placed order.
    OrderId
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ids_round_trip_through_display() {
        let id = UserId::new();
        let parsed = UserId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn ids_serialize_as_uuid_strings() {
        let id = ProductId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn distinct_ids_differ() {
        assert_ne!(OrderId::new(), OrderId::new());
    }
}
