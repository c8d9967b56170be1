//! # mandi-state — Marketplace Stores
//!
//! In-memory storage for the four resource types plus the token index.
//! Each resource gets its own `DashMap`; the whole store is cheaply
//! cloneable via `Arc` and safe under concurrent request handling —
//! row-level atomicity comes from DashMap's per-entry locking.
//!
//! The store is where data invariants live:
//!
//! - email uniqueness (normalized form) and category-name uniqueness;
//! - referential integrity at insert time (a product's farmer and
//!   category must exist, an order's buyer and product must exist);
//! - referential protection at delete time (a category with products, a
//!   product with orders, and a user with products or orders cannot be
//!   deleted).
//!
//! The authorization engine never touches this crate — handlers load an
//! entity here first, then ask the engine for a decision on it.

pub mod records;
pub mod store;

pub use records::{Category, Order, Product, User};
pub use store::{MarketStore, StoreError};
