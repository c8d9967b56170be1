//! # Decision Tables
//!
//! The authoritative mapping from (staff/role/ownership, action, resource
//! kind) to ALLOW/DENY.
//!
//! | Resource | list/read | create | update | delete |
//! |----------|-----------|--------|--------|--------|
//! | User     | staff: any; else own record | n/a (registration is unauthenticated) | staff or own record | staff only |
//! | Category | anyone    | staff  | staff  | staff  |
//! | Product  | anyone    | staff or farmer | staff or owner | staff or owner |
//! | Order    | staff: all; buyer: own | staff or buyer | staff only | staff only |
//!
//! Staff is checked first and short-circuits to ALLOW everywhere. Every
//! match ends in an explicit deny arm, so unrecognized combinations fail
//! closed.

use serde::Serialize;

use mandi_core::Role;

use crate::actor::{Actor, Owned};

/// Intended operation on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Enumerate a collection.
    List,
    /// Disclose one entity.
    Read,
    /// Create a new entity.
    Create,
    /// Mutate an existing entity.
    Update,
    /// Remove an existing entity.
    Delete,
}

/// The four resource types of the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// User accounts.
    User,
    /// Product categories.
    Category,
    /// Product listings.
    Product,
    /// Placed orders.
    Order,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The action may proceed.
    Allow,
    /// The action is forbidden for this actor.
    Deny,
}

impl Decision {
    /// True for [`Decision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

fn allow_if(condition: bool) -> Decision {
    if condition {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Collection-level check — invoked before an action that has no existing
/// target yet (create) or that lists a whole collection.
///
/// Listing orders is allowed for buyers as well as staff; the handler then
/// scopes the result set (staff see all orders, a buyer only their own).
pub fn can_perform(actor: &Actor, action: Action, resource: ResourceKind) -> Decision {
    // Staff privilege overrides everything.
    if actor.is_staff() {
        return Decision::Allow;
    }

    match (resource, action) {
        // Public catalog reads, anonymous included.
        (ResourceKind::Category | ResourceKind::Product, Action::List | Action::Read) => {
            Decision::Allow
        }

        // Listing user accounts is staff-only; account creation happens at
        // the unauthenticated registration endpoint, outside the engine.
        (ResourceKind::User, _) => Decision::Deny,

        // Catalog writes are staff-only.
        (ResourceKind::Category, _) => Decision::Deny,

        // Farmers list products; all other product collection actions are
        // object-level or staff-only.
        (ResourceKind::Product, Action::Create) => allow_if(actor.has_role(Role::Farmer)),
        (ResourceKind::Product, _) => Decision::Deny,

        // Buyers place and list (their own) orders.
        (ResourceKind::Order, Action::List | Action::Read | Action::Create) => {
            allow_if(actor.has_role(Role::Buyer))
        }
        (ResourceKind::Order, _) => Decision::Deny,
    }
}

/// Object-level check — invoked for read/update/delete of one existing
/// entity. The caller resolves the target first (404 before 403) and the
/// store's referential integrity guarantees the owner reference is sound.
pub fn can_perform_on(
    actor: &Actor,
    action: Action,
    resource: ResourceKind,
    target: &impl Owned,
) -> Decision {
    // Staff privilege overrides everything.
    if actor.is_staff() {
        return Decision::Allow;
    }

    let is_owner = actor.id() == Some(target.owner());

    match (resource, action) {
        // Public catalog reads, anonymous included.
        (ResourceKind::Category | ResourceKind::Product, Action::Read) => Decision::Allow,

        // A user reads and updates their own record; deletion is staff-only.
        (ResourceKind::User, Action::Read | Action::Update) => allow_if(is_owner),
        (ResourceKind::User, _) => Decision::Deny,

        // Catalog writes are staff-only.
        (ResourceKind::Category, _) => Decision::Deny,

        // A product is mutated by its owning farmer.
        (ResourceKind::Product, Action::Update | Action::Delete) => allow_if(is_owner),
        (ResourceKind::Product, _) => Decision::Deny,

        // An order is visible to its buyer; mutation and deletion are
        // staff-only, even for the buyer who placed it.
        (ResourceKind::Order, Action::Read) => allow_if(is_owner),
        (ResourceKind::Order, _) => Decision::Deny,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandi_core::UserId;

    /// Minimal owned entity for table tests.
    struct Entity {
        owner: UserId,
    }

    impl Owned for Entity {
        fn owner(&self) -> UserId {
            self.owner
        }
    }

    fn staff() -> Actor {
        Actor::Authenticated {
            id: UserId::new(),
            role: None,
            is_staff: true,
        }
    }

    fn with_role(role: Role) -> Actor {
        Actor::Authenticated {
            id: UserId::new(),
            role: Some(role),
            is_staff: false,
        }
    }

    const ALL_ACTIONS: [Action; 5] = [
        Action::List,
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    const ALL_RESOURCES: [ResourceKind; 4] = [
        ResourceKind::User,
        ResourceKind::Category,
        ResourceKind::Product,
        ResourceKind::Order,
    ];

    #[test]
    fn staff_short_circuits_every_cell() {
        let actor = staff();
        let other = Entity { owner: UserId::new() };
        for resource in ALL_RESOURCES {
            for action in ALL_ACTIONS {
                assert_eq!(
                    can_perform(&actor, action, resource),
                    Decision::Allow,
                    "collection {resource:?}/{action:?}"
                );
                assert_eq!(
                    can_perform_on(&actor, action, resource, &other),
                    Decision::Allow,
                    "object {resource:?}/{action:?}"
                );
            }
        }
    }

    #[test]
    fn anonymous_reads_catalog_only() {
        let anon = Actor::Anonymous;
        for resource in [ResourceKind::Category, ResourceKind::Product] {
            assert!(can_perform(&anon, Action::List, resource).is_allowed());
            assert!(can_perform(&anon, Action::Read, resource).is_allowed());
            assert!(!can_perform(&anon, Action::Create, resource).is_allowed());
            assert!(!can_perform(&anon, Action::Update, resource).is_allowed());
            assert!(!can_perform(&anon, Action::Delete, resource).is_allowed());
        }
        for resource in [ResourceKind::User, ResourceKind::Order] {
            for action in ALL_ACTIONS {
                assert_eq!(
                    can_perform(&anon, action, resource),
                    Decision::Deny,
                    "{resource:?}/{action:?}"
                );
            }
        }
    }

    #[test]
    fn anonymous_object_reads_catalog_only() {
        let anon = Actor::Anonymous;
        let entity = Entity { owner: UserId::new() };
        assert!(can_perform_on(&anon, Action::Read, ResourceKind::Category, &entity).is_allowed());
        assert!(can_perform_on(&anon, Action::Read, ResourceKind::Product, &entity).is_allowed());
        assert!(!can_perform_on(&anon, Action::Read, ResourceKind::User, &entity).is_allowed());
        assert!(!can_perform_on(&anon, Action::Read, ResourceKind::Order, &entity).is_allowed());
        assert!(!can_perform_on(&anon, Action::Update, ResourceKind::Product, &entity).is_allowed());
    }

    #[test]
    fn user_reads_and_updates_own_record_only() {
        let actor = with_role(Role::Buyer);
        let own = Entity { owner: actor.id().unwrap() };
        let other = Entity { owner: UserId::new() };

        assert!(can_perform_on(&actor, Action::Read, ResourceKind::User, &own).is_allowed());
        assert!(can_perform_on(&actor, Action::Update, ResourceKind::User, &own).is_allowed());
        assert!(!can_perform_on(&actor, Action::Read, ResourceKind::User, &other).is_allowed());
        assert!(!can_perform_on(&actor, Action::Update, ResourceKind::User, &other).is_allowed());
        // Deletion is staff-only, even of one's own account.
        assert!(!can_perform_on(&actor, Action::Delete, ResourceKind::User, &own).is_allowed());
    }

    #[test]
    fn user_list_is_staff_only() {
        assert!(!can_perform(&with_role(Role::Buyer), Action::List, ResourceKind::User).is_allowed());
        assert!(can_perform(&staff(), Action::List, ResourceKind::User).is_allowed());
    }

    #[test]
    fn category_writes_are_staff_only() {
        let buyer = with_role(Role::Buyer);
        let farmer = with_role(Role::Farmer);
        assert!(!can_perform(&buyer, Action::Create, ResourceKind::Category).is_allowed());
        assert!(!can_perform(&farmer, Action::Create, ResourceKind::Category).is_allowed());

        let category = Entity { owner: UserId::new() };
        assert!(!can_perform_on(&buyer, Action::Update, ResourceKind::Category, &category).is_allowed());
        assert!(!can_perform_on(&buyer, Action::Delete, ResourceKind::Category, &category).is_allowed());
    }

    #[test]
    fn only_farmers_create_products() {
        assert!(can_perform(&with_role(Role::Farmer), Action::Create, ResourceKind::Product).is_allowed());
        assert!(!can_perform(&with_role(Role::Buyer), Action::Create, ResourceKind::Product).is_allowed());
        assert!(!can_perform(&with_role(Role::Transporter), Action::Create, ResourceKind::Product).is_allowed());
        // A roleless account cannot create products either.
        let roleless = Actor::Authenticated {
            id: UserId::new(),
            role: None,
            is_staff: false,
        };
        assert!(!can_perform(&roleless, Action::Create, ResourceKind::Product).is_allowed());
    }

    #[test]
    fn product_mutation_requires_ownership() {
        let farmer = with_role(Role::Farmer);
        let own = Entity { owner: farmer.id().unwrap() };
        let foreign = Entity { owner: UserId::new() };

        assert!(can_perform_on(&farmer, Action::Update, ResourceKind::Product, &own).is_allowed());
        assert!(can_perform_on(&farmer, Action::Delete, ResourceKind::Product, &own).is_allowed());
        assert!(!can_perform_on(&farmer, Action::Update, ResourceKind::Product, &foreign).is_allowed());
        assert!(!can_perform_on(&farmer, Action::Delete, ResourceKind::Product, &foreign).is_allowed());

        // A buyer cannot mutate a product they do not own.
        let buyer = with_role(Role::Buyer);
        assert!(!can_perform_on(&buyer, Action::Update, ResourceKind::Product, &foreign).is_allowed());
    }

    #[test]
    fn only_buyers_create_and_list_orders() {
        assert!(can_perform(&with_role(Role::Buyer), Action::Create, ResourceKind::Order).is_allowed());
        assert!(can_perform(&with_role(Role::Buyer), Action::List, ResourceKind::Order).is_allowed());
        assert!(!can_perform(&with_role(Role::Farmer), Action::Create, ResourceKind::Order).is_allowed());
        assert!(!can_perform(&with_role(Role::Farmer), Action::List, ResourceKind::Order).is_allowed());
        assert!(!can_perform(&with_role(Role::Transporter), Action::List, ResourceKind::Order).is_allowed());
    }

    #[test]
    fn buyer_reads_own_order_only() {
        let buyer = with_role(Role::Buyer);
        let own = Entity { owner: buyer.id().unwrap() };
        let foreign = Entity { owner: UserId::new() };
        assert!(can_perform_on(&buyer, Action::Read, ResourceKind::Order, &own).is_allowed());
        assert!(!can_perform_on(&buyer, Action::Read, ResourceKind::Order, &foreign).is_allowed());
    }

    #[test]
    fn order_mutation_denied_even_for_its_buyer() {
        let buyer = with_role(Role::Buyer);
        let own = Entity { owner: buyer.id().unwrap() };
        assert!(!can_perform_on(&buyer, Action::Update, ResourceKind::Order, &own).is_allowed());
        assert!(!can_perform_on(&buyer, Action::Delete, ResourceKind::Order, &own).is_allowed());
    }

    #[test]
    fn ownership_is_id_equality_not_field_equality() {
        // Two distinct accounts with identical roles are not owners of each
        // other's entities — the comparison is on the stable id alone.
        let a = with_role(Role::Farmer);
        let b = with_role(Role::Farmer);
        let owned_by_a = Entity { owner: a.id().unwrap() };
        assert!(!can_perform_on(&b, Action::Update, ResourceKind::Product, &owned_by_a).is_allowed());
    }

    mod idempotence {
        use super::*;
        use proptest::prelude::*;

        fn action_strategy() -> impl Strategy<Value = Action> {
            prop_oneof![
                Just(Action::List),
                Just(Action::Read),
                Just(Action::Create),
                Just(Action::Update),
                Just(Action::Delete),
            ]
        }

        fn resource_strategy() -> impl Strategy<Value = ResourceKind> {
            prop_oneof![
                Just(ResourceKind::User),
                Just(ResourceKind::Category),
                Just(ResourceKind::Product),
                Just(ResourceKind::Order),
            ]
        }

        fn actor_strategy() -> impl Strategy<Value = Actor> {
            let role = prop_oneof![
                Just(None),
                Just(Some(Role::Farmer)),
                Just(Some(Role::Buyer)),
                Just(Some(Role::Transporter)),
            ];
            prop_oneof![
                Just(Actor::Anonymous),
                (role, any::<bool>(), any::<u128>()).prop_map(|(role, is_staff, seed)| {
                    Actor::Authenticated {
                        id: UserId::from_uuid(uuid::Uuid::from_u128(seed)),
                        role,
                        is_staff,
                    }
                }),
            ]
        }

        proptest! {
            // Repeated identical queries return the same decision — the
            // engine is a pure function with no hidden state drift.
            #[test]
            fn decisions_are_stable(
                actor in actor_strategy(),
                action in action_strategy(),
                resource in resource_strategy(),
                owner_seed in any::<u128>(),
            ) {
                let target = Entity {
                    owner: UserId::from_uuid(uuid::Uuid::from_u128(owner_seed)),
                };
                let first = can_perform(&actor, action, resource);
                let second = can_perform(&actor, action, resource);
                prop_assert_eq!(first, second);

                let first_on = can_perform_on(&actor, action, resource, &target);
                let second_on = can_perform_on(&actor, action, resource, &target);
                prop_assert_eq!(first_on, second_on);
            }

            // Staff allowance holds for arbitrary ids and targets.
            #[test]
            fn staff_always_allowed(
                action in action_strategy(),
                resource in resource_strategy(),
                seed in any::<u128>(),
                owner_seed in any::<u128>(),
            ) {
                let actor = Actor::Authenticated {
                    id: UserId::from_uuid(uuid::Uuid::from_u128(seed)),
                    role: None,
                    is_staff: true,
                };
                let target = Entity {
                    owner: UserId::from_uuid(uuid::Uuid::from_u128(owner_seed)),
                };
                prop_assert_eq!(can_perform(&actor, action, resource), Decision::Allow);
                prop_assert_eq!(
                    can_perform_on(&actor, action, resource, &target),
                    Decision::Allow
                );
            }
        }
    }
}
