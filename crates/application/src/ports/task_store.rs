use async_trait::async_trait;
use opportune_core::{AppResult, OrganizationId, TaskId, UserId};
use opportune_domain::{Task, TaskStatus};

/// Port for task persistence.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persists a new task.
    async fn create(&self, task: Task) -> AppResult<Task>;

    /// Finds a task by id.
    async fn find_by_id(&self, id: TaskId) -> AppResult<Option<Task>>;

    /// Lists every stored task.
    async fn list_all(&self) -> AppResult<Vec<Task>>;

    /// Lists ids of tasks owned by one organization.
    async fn list_ids_by_organization(
        &self,
        organization: OrganizationId,
    ) -> AppResult<Vec<TaskId>>;

    /// Lists ids of tasks created by one principal.
    async fn list_ids_by_creator(&self, creator: UserId) -> AppResult<Vec<TaskId>>;

    /// Stores the updated task only when the stored status still matches
    /// `expected`; fails with `Conflict` on a stale expectation.
    async fn update_if_status(&self, task: Task, expected: TaskStatus) -> AppResult<Task>;
}
