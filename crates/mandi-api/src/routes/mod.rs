//! # Route Modules
//!
//! One module per resource, each exposing a `router()` that the app
//! assembly merges. Handlers are thin orchestration: resolve the target,
//! ask the engine, delegate to the store, mirror to Postgres, shape the
//! response.
//!
//! | Prefix | Module | Domain |
//! |--------|--------|--------|
//! | `/auth/*` | [`auth`] | Registration and login (unauthenticated) |
//! | `/users/*` | [`users`] | Account administration |
//! | `/categories/*` | [`categories`] | Catalog taxonomy |
//! | `/products/*` | [`products`] | Product listings |
//! | `/orders/*` | [`orders`] | Order lifecycle |

pub mod auth;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;
