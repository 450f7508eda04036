use std::collections::HashMap;

use async_trait::async_trait;
use opportune_application::TaskRepository;
use opportune_core::{AppError, AppResult, OrganizationId, TaskId, UserId};
use opportune_domain::{Task, TaskStatus};
use tokio::sync::RwLock;

/// In-memory task repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: Task) -> AppResult<Task> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id()) {
            return Err(AppError::Conflict(format!(
                "task '{}' already exists",
                task.id()
            )));
        }

        tasks.insert(task.id(), task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> AppResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut values: Vec<Task> = tasks.values().cloned().collect();
        values.sort_by_key(|task| (task.created_at(), task.id()));
        Ok(values)
    }

    async fn list_ids_by_organization(
        &self,
        organization: OrganizationId,
    ) -> AppResult<Vec<TaskId>> {
        let tasks = self.tasks.read().await;
        let mut ids: Vec<TaskId> = tasks
            .values()
            .filter(|task| task.organization() == Some(organization))
            .map(Task::id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_ids_by_creator(&self, creator: UserId) -> AppResult<Vec<TaskId>> {
        let tasks = self.tasks.read().await;
        let mut ids: Vec<TaskId> = tasks
            .values()
            .filter(|task| task.creator() == creator)
            .map(Task::id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn update_if_status(&self, task: Task, expected: TaskStatus) -> AppResult<Task> {
        let mut tasks = self.tasks.write().await;
        let Some(stored) = tasks.get_mut(&task.id()) else {
            return Err(AppError::NotFound(format!(
                "task '{}' does not exist",
                task.id()
            )));
        };

        if stored.status() != expected {
            return Err(AppError::Conflict(format!(
                "task '{}' was expected in status '{}' but is '{}'",
                task.id(),
                expected.as_str(),
                stored.status().as_str()
            )));
        }

        *stored = task.clone();
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use opportune_application::TaskRepository;
    use opportune_core::{AppError, UserId};
    use opportune_domain::{Reward, RewardKind, Task, TaskDraft, TaskStatus, TaskVisibility};

    use super::InMemoryTaskRepository;

    fn task(status: TaskStatus) -> Task {
        let draft = TaskDraft {
            title: "Stock inventory".to_owned(),
            description: String::new(),
            organization: None,
            visibility: TaskVisibility::Global,
            required_skills: vec![],
            reward: Reward::new(RewardKind::Monetary, "50").unwrap_or_else(|_| unreachable!()),
        };
        Task::from_draft(draft, UserId::new(), status, Utc::now())
            .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn compare_and_set_rejects_a_stale_expectation() {
        let repository = InMemoryTaskRepository::new();
        let Ok(stored) = repository.create(task(TaskStatus::Pending)).await else {
            panic!("create succeeds");
        };

        let mut winner = stored.clone();
        winner.mark_published(UserId::new(), Utc::now());
        let won = repository.update_if_status(winner, TaskStatus::Pending).await;
        assert!(won.is_ok());

        let mut loser = stored;
        loser.mark_archived(UserId::new());
        let lost = repository.update_if_status(loser, TaskStatus::Pending).await;
        assert!(matches!(lost, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_of_a_missing_task_is_not_found() {
        let repository = InMemoryTaskRepository::new();
        let result = repository
            .update_if_status(task(TaskStatus::Pending), TaskStatus::Pending)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
