use serde::{Deserialize, Serialize};
use std::fmt;

use super::repository::EntityKind;

/// The person requesting a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.role.label())
    }
}

/// Coarse roles distinguished by the default policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Administrator,
    BackOffice,
    Tenant,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::BackOffice => "back_office",
            Self::Tenant => "tenant",
        }
    }
}

/// Authorization check evaluated before a transition is attempted.
///
/// The state machines trust that this has already passed; a denial is
/// reported as a permission failure, never as an invalid edge.
pub trait TransitionPolicy: Send + Sync {
    fn can_transition(&self, actor: &Actor, entity: EntityKind, target: &str) -> bool;
}

/// Default role matrix.
///
/// Administrators may perform every transition. Back-office staff handle the
/// day-to-day lifecycle but not the financial terminals (marking invoices
/// paid/void/uncollected, settling deposits, finalizing leases). Tenants
/// cannot transition anything; their requests arrive through staff.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleMatrix;

impl TransitionPolicy for RoleMatrix {
    fn can_transition(&self, actor: &Actor, entity: EntityKind, target: &str) -> bool {
        match actor.role {
            ActorRole::Administrator => true,
            ActorRole::Tenant => false,
            ActorRole::BackOffice => !matches!(
                (entity, target),
                (EntityKind::Invoice, "paid")
                    | (EntityKind::Invoice, "void")
                    | (EntityKind::Invoice, "uncollected")
                    | (EntityKind::Deposit, _)
                    | (EntityKind::Lease, "finalized")
            ),
        }
    }
}

/// Policy that admits every actor; useful for tests and demos.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl TransitionPolicy for AllowAll {
    fn can_transition(&self, _actor: &Actor, _entity: EntityKind, _target: &str) -> bool {
        true
    }
}
