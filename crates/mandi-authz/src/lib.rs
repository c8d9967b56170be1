//! # mandi-authz — Authorization Engine
//!
//! Pure decision functions deciding, per request, per role, per object,
//! whether an action is permitted. Consulted by every endpoint in
//! `mandi-api` before mutation or disclosure.
//!
//! ## Shape
//!
//! Two check points per resource type, mirroring collection-level and
//! item-level operations:
//!
//! - [`can_perform`] — before an action with no existing target
//!   (create, list).
//! - [`can_perform_on`] — for read/update/delete of one existing entity;
//!   inspects the entity's owning identity via the [`Owned`] capability
//!   and compares it to the actor.
//!
//! ## Invariants
//!
//! - Staff privilege is checked first and always short-circuits to ALLOW
//!   for every resource and action.
//! - Anonymous actors are denied everything except list/read of categories
//!   and products.
//! - Ownership comparison is strict identity equality on the stored owner
//!   id, never on mutable fields like email or name.
//! - Unrecognized combinations fail closed: the final arm of every match
//!   is a deny.
//!
//! No internal state, no I/O, no clock — a pure function of its inputs,
//! testable without a running service.

pub mod actor;
pub mod engine;

pub use actor::{Actor, Owned};
pub use engine::{can_perform, can_perform_on, Action, Decision, ResourceKind};
