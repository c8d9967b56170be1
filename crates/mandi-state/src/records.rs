//! # Entity Records
//!
//! The stored shape of each resource. These are storage records, not wire
//! DTOs — `mandi-api` defines its own request/response types and never
//! serializes a password digest out of here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mandi_authz::Owned;
use mandi_core::{Amount, CategoryId, OrderId, OrderStatus, ProductId, ProductStatus, Role, UserId};

/// A user account.
///
/// `email` is always the normalized form. `password` holds the salted
/// digest (`salt:digest`, hex), never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone_number: String,
    pub address: String,
    pub role: Option<Role>,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh, active, non-staff account.
    pub fn new(
        email: String,
        password: String,
        name: String,
        phone_number: String,
        address: String,
        role: Option<Role>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            password,
            name,
            phone_number,
            address,
            role,
            is_staff: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user record is owned by itself — "is this my account" is the same
/// question as every other ownership check.
impl Owned for User {
    fn owner(&self) -> UserId {
        self.id
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A listed product, owned by exactly one farmer and classified under
/// exactly one category. `price` is minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub farmer: UserId,
    pub category: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Amount,
    pub quantity: u32,
    pub unit: String,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A fresh listing, available for sale.
    pub fn new(
        farmer: UserId,
        category: CategoryId,
        name: String,
        description: String,
        price: Amount,
        quantity: u32,
        unit: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            farmer,
            category,
            name,
            description,
            price,
            quantity,
            unit,
            status: ProductStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Product {
    fn owner(&self) -> UserId {
        self.farmer
    }
}

/// A placed order. `total_price` is computed at creation from the
/// product's price at that moment and never recomputed — later price
/// changes do not touch existing orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer: UserId,
    pub product: ProductId,
    pub quantity: u32,
    pub total_price: Amount,
    pub status: OrderStatus,
    pub delivery_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// A freshly placed order, pending confirmation.
    pub fn new(buyer: UserId, product: ProductId, quantity: u32, total_price: Amount) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            buyer,
            product,
            quantity,
            total_price,
            status: OrderStatus::Pending,
            delivery_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Order {
    fn owner(&self) -> UserId {
        self.buyer
    }
}
