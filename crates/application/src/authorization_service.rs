use opportune_core::{AppError, AppResult, OrganizationId, UserId};
use opportune_domain::{Permission, Principal};
use serde::{Deserialize, Serialize};

/// Optional hint bundle attached to one authorization check.
///
/// Used only for ownership/organization escalation, never for base role
/// grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionContext {
    /// Creator of the task the check concerns.
    pub task_creator: Option<UserId>,
    /// Organization owning the resource the check concerns.
    pub organization: Option<OrganizationId>,
}

impl PermissionContext {
    /// Creates a context for a task-scoped check.
    #[must_use]
    pub fn for_task(task_creator: UserId, organization: Option<OrganizationId>) -> Self {
        Self {
            task_creator: Some(task_creator),
            organization,
        }
    }
}

/// Why a permission check came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantSource {
    /// No role grant and no escalation applied.
    DeniedNoGrant,
    /// A role in the principal's role set grants the permission.
    GrantedByRole,
    /// The principal created the resource in context.
    GrantedByOwnership,
    /// The principal's organization owns the resource in context.
    GrantedByOrgAffiliation,
}

/// Structured outcome of one permission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDecision {
    allowed: bool,
    grant: GrantSource,
    denied_message: Option<String>,
}

impl PermissionDecision {
    /// Returns whether the action is allowed.
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the tagged grant source behind the decision.
    #[must_use]
    pub fn grant(&self) -> GrantSource {
        self.grant
    }

    /// Returns the denial message when the check failed.
    #[must_use]
    pub fn denied_message(&self) -> Option<&str> {
        self.denied_message.as_deref()
    }

    fn granted(grant: GrantSource) -> Self {
        Self {
            allowed: true,
            grant,
            denied_message: None,
        }
    }

    fn denied(principal: &Principal, permission: Permission) -> Self {
        Self {
            allowed: false,
            grant: GrantSource::DeniedNoGrant,
            denied_message: Some(format!(
                "principal '{}' is missing permission '{}'",
                principal.id(),
                permission.as_str()
            )),
        }
    }
}

/// Pre-resolved full/own-only access pair for tiered reads.
///
/// Callers query the two permissions explicitly and combine the booleans
/// themselves; the authorizer never infers one from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessFlags {
    /// Full (unscoped) access variant granted.
    pub full: bool,
    /// Own-only access variant granted.
    pub own: bool,
}

impl AccessFlags {
    /// Returns whether either access variant is granted.
    #[must_use]
    pub fn any(&self) -> bool {
        self.full || self.own
    }
}

/// Resolves whether a principal may perform an action, combining role grants
/// with ownership/organization escalation.
///
/// Checks are pure functions of (role set, permission, context): no I/O, no
/// side effects, identical inputs produce identical decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationService;

impl AuthorizationService {
    /// Creates the authorizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Checks one permission for one principal.
    ///
    /// Base case: any assigned role grants the permission. Escalation applies
    /// only to the approval-flow subset: the principal owns the task in
    /// context, or its organization owns the resource in context. A normal
    /// denial is a structured decision, never an error.
    #[must_use]
    pub fn check_permission(
        &self,
        principal: &Principal,
        permission: Permission,
        context: Option<&PermissionContext>,
    ) -> PermissionDecision {
        if principal.any_role_grants(permission) {
            return PermissionDecision::granted(GrantSource::GrantedByRole);
        }

        if permission.allows_escalation()
            && let Some(context) = context
        {
            if context.task_creator == Some(principal.id()) {
                return PermissionDecision::granted(GrantSource::GrantedByOwnership);
            }

            if principal.organization().is_some() && principal.organization() == context.organization
            {
                return PermissionDecision::granted(GrantSource::GrantedByOrgAffiliation);
            }
        }

        PermissionDecision::denied(principal, permission)
    }

    /// Ensures the permission is granted, mapping a denial to `Forbidden`.
    pub fn require_permission(
        &self,
        principal: &Principal,
        permission: Permission,
        context: Option<&PermissionContext>,
    ) -> AppResult<()> {
        let decision = self.check_permission(principal, permission, context);
        if decision.allowed() {
            return Ok(());
        }

        Err(AppError::Forbidden(
            decision
                .denied_message()
                .unwrap_or("permission denied")
                .to_owned(),
        ))
    }

    /// Resolves the explicit full/own-only access pair for tiered reads.
    #[must_use]
    pub fn access_flags(
        &self,
        principal: &Principal,
        full: Permission,
        own: Permission,
    ) -> AccessFlags {
        AccessFlags {
            full: self.check_permission(principal, full, None).allowed(),
            own: self.check_permission(principal, own, None).allowed(),
        }
    }
}
