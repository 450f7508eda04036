use async_trait::async_trait;
use opportune_core::{AppResult, ApplicationId, TaskId, UserId};
use opportune_domain::{Application, ApplicationStatus};
use serde::{Deserialize, Serialize};

/// Filter describing which application records a principal may read.
///
/// Produced by the visibility scope builder and interpreted by the store;
/// services never fetch applications outside a computed scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApplicationScope {
    /// Every application; global admin listing only.
    All,
    /// Applications for one task, unrestricted by applicant.
    Task {
        /// Scoping task id.
        task: TaskId,
    },
    /// The principal's own applications for one task.
    OwnForTask {
        /// Applicant bound to the scope.
        applicant: UserId,
        /// Scoping task id.
        task: TaskId,
    },
    /// The principal's own applications across all tasks.
    Own {
        /// Applicant bound to the scope.
        applicant: UserId,
    },
    /// Applications whose task is in a pre-resolved id set.
    Tasks {
        /// Eligible task ids.
        tasks: Vec<TaskId>,
    },
}

impl ApplicationScope {
    /// Returns whether the application falls inside this scope.
    #[must_use]
    pub fn contains(&self, application: &Application) -> bool {
        match self {
            Self::All => true,
            Self::Task { task } => application.task() == *task,
            Self::OwnForTask { applicant, task } => {
                application.applicant() == *applicant && application.task() == *task
            }
            Self::Own { applicant } => application.applicant() == *applicant,
            Self::Tasks { tasks } => tasks.contains(&application.task()),
        }
    }
}

/// Port for application persistence.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Persists a new application; fails with `Conflict` when one already
    /// exists for the same (task, applicant) pair.
    async fn create(&self, application: Application) -> AppResult<Application>;

    /// Finds an application by id.
    async fn find_by_id(&self, id: ApplicationId) -> AppResult<Option<Application>>;

    /// Lists applications inside one scope, oldest first.
    async fn list_by_scope(&self, scope: &ApplicationScope) -> AppResult<Vec<Application>>;

    /// Stores the updated application only when the stored status still
    /// matches `expected`; fails with `Conflict` on a stale expectation.
    async fn update_if_status(
        &self,
        application: Application,
        expected: ApplicationStatus,
    ) -> AppResult<Application>;
}
