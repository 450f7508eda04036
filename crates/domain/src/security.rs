use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use opportune_core::AppError;
use serde::{Deserialize, Serialize};

/// Permissions enforced by application policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows posting a new task.
    TaskCreate,
    /// Allows reading published tasks.
    TaskRead,
    /// Allows reading internal-visibility tasks of the own organization.
    TaskViewInternal,
    /// Allows reading tasks still pending approval.
    TaskViewPending,
    /// Allows approving or declining a pending task.
    TaskApprove,
    /// Publishes tasks at creation time without a separate approval step.
    TaskAutoPublish,
    /// Allows reading every application in scope.
    ApplicationRead,
    /// Allows reading only the caller's own applications.
    ApplicationReadOwn,
    /// Allows shortlisting a submitted application.
    ApplicationShortlist,
    /// Allows approving a shortlisted application.
    ApplicationApprove,
    /// Allows rejecting a shortlisted application.
    ApplicationReject,
    /// Allows extending an offer to a shortlisted applicant.
    ApplicationOffer,
    /// Allows reading user directory entries.
    UserRead,
    /// Allows assigning and removing user roles.
    UserManageRoles,
    /// Allows deleting user accounts.
    UserDelete,
    /// Allows bulk-importing user accounts.
    UserImport,
    /// Allows creating organizations.
    OrgCreate,
    /// Allows updating organization settings.
    OrgUpdate,
    /// Allows changing global administrative settings.
    AdminSettings,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCreate => "task.create",
            Self::TaskRead => "task.read",
            Self::TaskViewInternal => "task.view_internal",
            Self::TaskViewPending => "task.view_pending",
            Self::TaskApprove => "task.approve",
            Self::TaskAutoPublish => "task.auto_publish",
            Self::ApplicationRead => "application.read",
            Self::ApplicationReadOwn => "application.read_own",
            Self::ApplicationShortlist => "application.shortlist",
            Self::ApplicationApprove => "application.approve",
            Self::ApplicationReject => "application.reject",
            Self::ApplicationOffer => "application.offer",
            Self::UserRead => "user.read",
            Self::UserManageRoles => "user.manage_roles",
            Self::UserDelete => "user.delete",
            Self::UserImport => "user.import",
            Self::OrgCreate => "org.create",
            Self::OrgUpdate => "org.update",
            Self::AdminSettings => "admin.settings",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::TaskCreate,
            Permission::TaskRead,
            Permission::TaskViewInternal,
            Permission::TaskViewPending,
            Permission::TaskApprove,
            Permission::TaskAutoPublish,
            Permission::ApplicationRead,
            Permission::ApplicationReadOwn,
            Permission::ApplicationShortlist,
            Permission::ApplicationApprove,
            Permission::ApplicationReject,
            Permission::ApplicationOffer,
            Permission::UserRead,
            Permission::UserManageRoles,
            Permission::UserDelete,
            Permission::UserImport,
            Permission::OrgCreate,
            Permission::OrgUpdate,
            Permission::AdminSettings,
        ];

        ALL
    }

    /// Returns whether ownership/organization escalation may grant this permission.
    ///
    /// Only the approval-flow permissions escalate; everything else is granted
    /// by role membership alone.
    #[must_use]
    pub fn allows_escalation(&self) -> bool {
        matches!(
            self,
            Self::TaskApprove
                | Self::ApplicationShortlist
                | Self::ApplicationApprove
                | Self::ApplicationReject
                | Self::ApplicationOffer
        )
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "task.create" => Ok(Self::TaskCreate),
            "task.read" => Ok(Self::TaskRead),
            "task.view_internal" => Ok(Self::TaskViewInternal),
            "task.view_pending" => Ok(Self::TaskViewPending),
            "task.approve" => Ok(Self::TaskApprove),
            "task.auto_publish" => Ok(Self::TaskAutoPublish),
            "application.read" => Ok(Self::ApplicationRead),
            "application.read_own" => Ok(Self::ApplicationReadOwn),
            "application.shortlist" => Ok(Self::ApplicationShortlist),
            "application.approve" => Ok(Self::ApplicationApprove),
            "application.reject" => Ok(Self::ApplicationReject),
            "application.offer" => Ok(Self::ApplicationOffer),
            "user.read" => Ok(Self::UserRead),
            "user.manage_roles" => Ok(Self::UserManageRoles),
            "user.delete" => Ok(Self::UserDelete),
            "user.import" => Ok(Self::UserImport),
            "org.create" => Ok(Self::OrgCreate),
            "org.update" => Ok(Self::OrgUpdate),
            "admin.settings" => Ok(Self::AdminSettings),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

/// Roles assignable to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Holds every permission unconditionally.
    GlobalAdmin,
    /// Administers one organization: approvals, users, settings.
    SchoolAdmin,
    /// Manages tasks and the hiring funnel for an organization.
    TaskManager,
    /// Posts tasks on behalf of an organization.
    TaskAdvertiser,
    /// Applies to published tasks.
    Applicant,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlobalAdmin => "global_admin",
            Self::SchoolAdmin => "school_admin",
            Self::TaskManager => "task_manager",
            Self::TaskAdvertiser => "task_advertiser",
            Self::Applicant => "applicant",
        }
    }

    /// Returns the precomputed capability set granted by this role.
    ///
    /// The set reflects the static mapping table only; the unconditional
    /// `GlobalAdmin` grant lives in [`Role::grants`].
    #[must_use]
    pub fn capabilities(&self) -> &'static HashSet<Permission> {
        match self {
            Self::GlobalAdmin => &GLOBAL_ADMIN_CAPABILITIES,
            Self::SchoolAdmin => &SCHOOL_ADMIN_CAPABILITIES,
            Self::TaskManager => &TASK_MANAGER_CAPABILITIES,
            Self::TaskAdvertiser => &TASK_ADVERTISER_CAPABILITIES,
            Self::Applicant => &APPLICANT_CAPABILITIES,
        }
    }

    /// Returns whether this role grants the permission.
    ///
    /// Pure and total: the check never fails, and `GlobalAdmin` satisfies
    /// every permission independent of the mapping table.
    #[must_use]
    pub fn grants(&self, permission: Permission) -> bool {
        if *self == Self::GlobalAdmin {
            return true;
        }

        self.capabilities().contains(&permission)
    }

    /// Parses a boundary role string into the closed role set.
    ///
    /// Normalizes exactly once at the boundary: matching is case-insensitive
    /// and treats underscores and spaces as interchangeable. Downstream code
    /// never re-normalizes.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let normalized = value.trim().to_lowercase().replace(' ', "_");
        match normalized.as_str() {
            "global_admin" => Ok(Self::GlobalAdmin),
            "school_admin" => Ok(Self::SchoolAdmin),
            "task_manager" => Ok(Self::TaskManager),
            "task_advertiser" => Ok(Self::TaskAdvertiser),
            "applicant" => Ok(Self::Applicant),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

static GLOBAL_ADMIN_CAPABILITIES: LazyLock<HashSet<Permission>> =
    LazyLock::new(|| Permission::all().iter().copied().collect());

static SCHOOL_ADMIN_CAPABILITIES: LazyLock<HashSet<Permission>> = LazyLock::new(|| {
    HashSet::from([
        Permission::TaskCreate,
        Permission::TaskRead,
        Permission::TaskViewInternal,
        Permission::TaskViewPending,
        Permission::TaskApprove,
        Permission::TaskAutoPublish,
        Permission::ApplicationRead,
        Permission::ApplicationShortlist,
        Permission::ApplicationApprove,
        Permission::ApplicationReject,
        Permission::ApplicationOffer,
        Permission::UserRead,
        Permission::UserManageRoles,
        Permission::UserImport,
        Permission::OrgUpdate,
    ])
});

static TASK_MANAGER_CAPABILITIES: LazyLock<HashSet<Permission>> = LazyLock::new(|| {
    HashSet::from([
        Permission::TaskCreate,
        Permission::TaskRead,
        Permission::TaskViewInternal,
        Permission::TaskViewPending,
        Permission::TaskApprove,
        Permission::TaskAutoPublish,
        Permission::ApplicationRead,
        Permission::ApplicationShortlist,
        Permission::ApplicationApprove,
        Permission::ApplicationReject,
        Permission::ApplicationOffer,
        Permission::UserRead,
    ])
});

static TASK_ADVERTISER_CAPABILITIES: LazyLock<HashSet<Permission>> = LazyLock::new(|| {
    HashSet::from([
        Permission::TaskCreate,
        Permission::TaskRead,
        Permission::TaskViewInternal,
        Permission::ApplicationRead,
        Permission::UserRead,
    ])
});

static APPLICANT_CAPABILITIES: LazyLock<HashSet<Permission>> = LazyLock::new(|| {
    HashSet::from([Permission::TaskRead, Permission::ApplicationReadOwn])
});

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Permission, Role};

    #[test]
    fn permission_roundtrip_storage_value() {
        for permission in Permission::all() {
            assert_eq!(Permission::from_str(permission.as_str()).ok(), Some(*permission));
        }
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert!(Permission::from_str("task.unknown").is_err());
    }

    #[test]
    fn global_admin_grants_every_permission() {
        for permission in Permission::all() {
            assert!(Role::GlobalAdmin.grants(*permission));
        }
    }

    #[test]
    fn applicant_cannot_approve_tasks() {
        assert!(!Role::Applicant.grants(Permission::TaskApprove));
        assert!(Role::Applicant.grants(Permission::ApplicationReadOwn));
    }

    #[test]
    fn missing_mapping_entries_fail_closed() {
        assert!(!Role::TaskAdvertiser.grants(Permission::AdminSettings));
        assert!(!Role::TaskManager.grants(Permission::UserDelete));
        assert!(!Role::SchoolAdmin.grants(Permission::AdminSettings));
    }

    #[test]
    fn role_parse_normalizes_case_and_separators() {
        assert_eq!(Role::parse("SCHOOL_ADMIN").ok(), Some(Role::SchoolAdmin));
        assert_eq!(Role::parse("school admin").ok(), Some(Role::SchoolAdmin));
        assert_eq!(Role::parse("  Task Manager ").ok(), Some(Role::TaskManager));
        assert!(Role::parse("superuser").is_err());
    }

    #[test]
    fn escalation_subset_is_limited_to_approval_flow() {
        assert!(Permission::TaskApprove.allows_escalation());
        assert!(Permission::ApplicationShortlist.allows_escalation());
        assert!(!Permission::AdminSettings.allows_escalation());
        assert!(!Permission::UserDelete.allows_escalation());
    }
}
