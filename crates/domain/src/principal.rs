use std::collections::BTreeSet;

use opportune_core::{OrganizationId, UserId};
use serde::{Deserialize, Serialize};

use crate::security::{Permission, Role};

/// An authenticated actor: identity, role set, optional organization affiliation.
///
/// A principal always carries a *set* of roles; there is no singular role
/// field anywhere in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: UserId,
    display_name: String,
    roles: BTreeSet<Role>,
    organization: Option<OrganizationId>,
}

impl Principal {
    /// Creates a principal from directory data.
    #[must_use]
    pub fn new(
        id: UserId,
        display_name: impl Into<String>,
        roles: BTreeSet<Role>,
        organization: Option<OrganizationId>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            roles,
            organization,
        }
    }

    /// Returns the principal's identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the assigned role set.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Returns the organization affiliation, if any.
    #[must_use]
    pub fn organization(&self) -> Option<OrganizationId> {
        self.organization
    }

    /// Returns whether the principal holds the global admin role.
    #[must_use]
    pub fn is_global_admin(&self) -> bool {
        self.roles.contains(&Role::GlobalAdmin)
    }

    /// Returns whether any assigned role grants the permission.
    #[must_use]
    pub fn any_role_grants(&self, permission: Permission) -> bool {
        self.roles.iter().any(|role| role.grants(permission))
    }
}
