use chrono::{DateTime, Utc};
use opportune_core::{AppError, AppResult, NonEmptyString, OrganizationId, TaskId, UserId};
use serde::{Deserialize, Serialize};

use crate::principal::Principal;

/// Publication status of a posted task.
///
/// Status only advances `Pending -> Published` or
/// `Pending/Published -> Archived`; there is no path out of `Archived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created and awaiting approval.
    Pending,
    /// Approved and visible per its visibility class.
    Published,
    /// Declined or retired; stands in for deletion.
    Archived,
}

impl TaskStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

/// Audience class for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskVisibility {
    /// Visible to every principal once published.
    Global,
    /// Visible only inside the owning organization.
    Internal,
    /// Visible to principals outside the owning organization.
    External,
}

/// Reward category attached to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Paid out in currency.
    Monetary,
    /// Credited as organization-internal points.
    Credit,
    /// Issued as a certificate of completion.
    Certificate,
}

/// Reward descriptor: category plus a free-form value such as an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    kind: RewardKind,
    value: NonEmptyString,
}

impl Reward {
    /// Creates a validated reward descriptor.
    pub fn new(kind: RewardKind, value: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            kind,
            value: NonEmptyString::new(value)?,
        })
    }

    /// Returns the reward category.
    #[must_use]
    pub fn kind(&self) -> RewardKind {
        self.kind
    }

    /// Returns the reward value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// A named skill, normalized to lower case exactly once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Skill(String);

impl Skill {
    /// Creates a skill with its name normalized to lower case.
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let normalized = name.into().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(AppError::Validation(
                "skill name must not be empty".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized skill name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.as_str()
    }
}

/// Input payload used to construct a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Short task title.
    pub title: String,
    /// Longer task description.
    pub description: String,
    /// Owning organization; `None` for independently created tasks.
    pub organization: Option<OrganizationId>,
    /// Audience class.
    pub visibility: TaskVisibility,
    /// Skills required to complete the task.
    pub required_skills: Vec<Skill>,
    /// Reward granted on completion.
    pub reward: Reward,
}

/// A posted task and its publication state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    organization: Option<OrganizationId>,
    creator: UserId,
    title: NonEmptyString,
    description: String,
    visibility: TaskVisibility,
    status: TaskStatus,
    approved_by: Option<UserId>,
    required_skills: Vec<Skill>,
    reward: Reward,
    created_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a task from a draft with its initial status.
    ///
    /// `published_at` is recorded when the task is born `Published`
    /// (auto-publish capability); creation never notifies anyone.
    pub fn from_draft(
        draft: TaskDraft,
        creator: UserId,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let TaskDraft {
            title,
            description,
            organization,
            visibility,
            required_skills,
            reward,
        } = draft;

        if status == TaskStatus::Archived {
            return Err(AppError::Validation(
                "a task cannot be created archived".to_owned(),
            ));
        }

        Ok(Self {
            id: TaskId::new(),
            organization,
            creator,
            title: NonEmptyString::new(title)?,
            description: description.trim().to_owned(),
            visibility,
            status,
            approved_by: None,
            required_skills,
            reward,
            created_at: now,
            published_at: (status == TaskStatus::Published).then_some(now),
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning organization, if any.
    #[must_use]
    pub fn organization(&self) -> Option<OrganizationId> {
        self.organization
    }

    /// Returns the creating principal's identifier.
    #[must_use]
    pub fn creator(&self) -> UserId {
        self.creator
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the audience class.
    #[must_use]
    pub fn visibility(&self) -> TaskVisibility {
        self.visibility
    }

    /// Returns the publication status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the approver recorded on publish or decline.
    #[must_use]
    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    /// Returns the skills required to complete the task.
    #[must_use]
    pub fn required_skills(&self) -> &[Skill] {
        &self.required_skills
    }

    /// Returns the reward descriptor.
    #[must_use]
    pub fn reward(&self) -> &Reward {
        &self.reward
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the first-publication timestamp, if ever published.
    #[must_use]
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    /// Marks the task published, recording the approver.
    ///
    /// `published_at` is only set on the first publication. Guards (permission,
    /// archived-status rejection) run before this is reached.
    pub fn mark_published(&mut self, approved_by: UserId, now: DateTime<Utc>) {
        self.status = TaskStatus::Published;
        self.approved_by = Some(approved_by);
        if self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }

    /// Marks the task archived, recording who declined or retired it.
    pub fn mark_archived(&mut self, approved_by: UserId) {
        self.status = TaskStatus::Archived;
        self.approved_by = Some(approved_by);
    }

    /// Returns whether the principal may read this task.
    ///
    /// An unauthenticated caller (`None`) sees only published global tasks.
    /// The access flags are resolved by the caller against the authorizer;
    /// this policy never consults the registry itself.
    #[must_use]
    pub fn visible_to(
        &self,
        principal: Option<&Principal>,
        can_view_pending: bool,
        can_view_internal: bool,
        include_archived: bool,
    ) -> bool {
        let Some(principal) = principal else {
            return self.status == TaskStatus::Published
                && self.visibility == TaskVisibility::Global;
        };

        if principal.is_global_admin() {
            return self.status != TaskStatus::Archived || include_archived;
        }

        if principal.id() == self.creator {
            return self.status != TaskStatus::Archived;
        }

        match (self.status, self.visibility) {
            (TaskStatus::Published, TaskVisibility::Global | TaskVisibility::External) => true,
            (TaskStatus::Pending, TaskVisibility::Global | TaskVisibility::External) => {
                can_view_pending
            }
            (TaskStatus::Published, TaskVisibility::Internal) => {
                can_view_internal
                    && self.organization.is_some()
                    && principal.organization() == self.organization
            }
            (TaskStatus::Pending, TaskVisibility::Internal) => {
                can_view_internal
                    && can_view_pending
                    && self.organization.is_some()
                    && principal.organization() == self.organization
            }
            (TaskStatus::Archived, _) => false,
        }
    }
}
