//! # Actor Context and the Ownership Capability
//!
//! The actor is passed explicitly into every authorization call — there is
//! no ambient "current request user". The auth middleware in `mandi-api`
//! builds one [`Actor`] per request and hands it down.

use mandi_core::{Role, UserId};

/// The identity (or anonymity) behind a request.
///
/// Carries exactly the three attributes the decision tables consult:
/// stable id, role, and the orthogonal staff bit. Everything else about
/// the user (email, name, activity flags) is invisible to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// No credential presented, or the credential did not resolve.
    Anonymous,
    /// A resolved, active user account.
    Authenticated {
        /// Stable account id. Ownership checks compare against this.
        id: UserId,
        /// Marketplace role, if the account declared one.
        role: Option<Role>,
        /// Administrative privilege, independent of role.
        is_staff: bool,
    },
}

impl Actor {
    /// True when the actor carries staff privilege.
    pub fn is_staff(&self) -> bool {
        matches!(self, Actor::Authenticated { is_staff: true, .. })
    }

    /// The actor's stable id, when authenticated.
    pub fn id(&self) -> Option<UserId> {
        match self {
            Actor::Anonymous => None,
            Actor::Authenticated { id, .. } => Some(*id),
        }
    }

    /// True when the actor is authenticated with the given role.
    pub fn has_role(&self, wanted: Role) -> bool {
        matches!(self, Actor::Authenticated { role: Some(r), .. } if *r == wanted)
    }
}

/// Capability exposing the owning identity of an entity.
///
/// Implemented per resource type: a product is owned by its farmer, an
/// order by its buyer, a user record by itself. The engine depends only on
/// this capability, never on concrete entity types.
pub trait Owned {
    /// Stable id of the owning user.
    fn owner(&self) -> UserId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_id_and_no_staff() {
        assert!(!Actor::Anonymous.is_staff());
        assert!(Actor::Anonymous.id().is_none());
        assert!(!Actor::Anonymous.has_role(Role::Buyer));
    }

    #[test]
    fn role_check_requires_exact_role() {
        let actor = Actor::Authenticated {
            id: UserId::new(),
            role: Some(Role::Farmer),
            is_staff: false,
        };
        assert!(actor.has_role(Role::Farmer));
        assert!(!actor.has_role(Role::Buyer));
    }

    #[test]
    fn staff_bit_is_independent_of_role() {
        let actor = Actor::Authenticated {
            id: UserId::new(),
            role: None,
            is_staff: true,
        };
        assert!(actor.is_staff());
        assert!(!actor.has_role(Role::Farmer));
    }
}
