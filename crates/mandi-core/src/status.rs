//! # Role and Status Enumerations
//!
//! Closed enumerations for the loosely-typed string fields of the wire
//! format. Unknown strings are rejected at deserialization time — the
//! authorization engine and the stores only ever see valid variants.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Marketplace role of a user account.
///
/// Staff privilege is deliberately NOT a role: it is an orthogonal flag on
/// the user record (`is_staff`), so the "staff overrides everything"
/// short-circuit in the authorization engine stays independent of this
/// enumeration. A user may also have no role at all (registration does not
/// require one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Lists and owns products.
    Farmer,
    /// Places orders.
    Buyer,
    /// Delivers orders. Carries no extra privileges in the current surface.
    Transporter,
}

impl Role {
    /// Canonical lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Buyer => "buyer",
            Role::Transporter => "transporter",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Role::Farmer),
            "buyer" => Ok(Role::Buyer),
            "transporter" => Ok(Role::Transporter),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// Listing status of a product.
///
/// No state machine is enforced — any value is settable by the owner or
/// staff at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Open for orders.
    Available,
    /// Stock exhausted.
    Sold,
    /// Withdrawn from the catalog without deletion.
    Inactive,
}

impl ProductStatus {
    /// Canonical lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::Sold => "sold",
            ProductStatus::Inactive => "inactive",
        }
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Available
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ProductStatus::Available),
            "sold" => Ok(ProductStatus::Sold),
            "inactive" => Ok(ProductStatus::Inactive),
            other => Err(ValidationError::UnknownProductStatus(other.to_string())),
        }
    }
}

/// Fulfilment status of an order. Mutated by staff only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, awaiting confirmation.
    Pending,
    /// Accepted by staff.
    Confirmed,
    /// Handed to a transporter.
    Shipped,
    /// Received by the buyer.
    Delivered,
    /// Cancelled by staff.
    Cancelled,
}

impl OrderStatus {
    /// Canonical lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ValidationError::UnknownOrderStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&Role::Farmer).unwrap();
        assert_eq!(json, "\"farmer\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Farmer);
    }

    #[test]
    fn unknown_role_rejected_at_deserialization() {
        let result: Result<Role, _> = serde_json::from_str("\"admin\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_role_rejected_by_from_str() {
        assert!("wholesaler".parse::<Role>().is_err());
    }

    #[test]
    fn product_status_defaults_to_available() {
        assert_eq!(ProductStatus::default(), ProductStatus::Available);
    }

    #[test]
    fn order_status_defaults_to_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn order_status_parses_all_wire_names() {
        for s in ["pending", "confirmed", "shipped", "delivered", "cancelled"] {
            assert_eq!(s.parse::<OrderStatus>().unwrap().as_str(), s);
        }
    }
}
