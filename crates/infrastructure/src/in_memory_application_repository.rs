use std::collections::HashMap;

use async_trait::async_trait;
use opportune_application::{ApplicationRepository, ApplicationScope};
use opportune_core::{AppError, AppResult, ApplicationId, TaskId, UserId};
use opportune_domain::{Application, ApplicationStatus};
use tokio::sync::RwLock;

/// In-memory application repository implementation.
///
/// Enforces the unique (task, applicant) pair with a secondary index.
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    applications: RwLock<HashMap<ApplicationId, Application>>,
    pairs: RwLock<HashMap<(TaskId, UserId), ApplicationId>>,
}

impl InMemoryApplicationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            applications: RwLock::new(HashMap::new()),
            pairs: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(&self, application: Application) -> AppResult<Application> {
        let mut applications = self.applications.write().await;
        let mut pairs = self.pairs.write().await;

        let pair = (application.task(), application.applicant());
        if pairs.contains_key(&pair) {
            return Err(AppError::Conflict(format!(
                "applicant '{}' already applied to task '{}'",
                application.applicant(),
                application.task()
            )));
        }

        pairs.insert(pair, application.id());
        applications.insert(application.id(), application.clone());
        Ok(application)
    }

    async fn find_by_id(&self, id: ApplicationId) -> AppResult<Option<Application>> {
        Ok(self.applications.read().await.get(&id).cloned())
    }

    async fn list_by_scope(&self, scope: &ApplicationScope) -> AppResult<Vec<Application>> {
        let applications = self.applications.read().await;
        let mut values: Vec<Application> = applications
            .values()
            .filter(|application| scope.contains(application))
            .cloned()
            .collect();
        values.sort_by_key(|application| (application.submitted_at(), application.id()));
        Ok(values)
    }

    async fn update_if_status(
        &self,
        application: Application,
        expected: ApplicationStatus,
    ) -> AppResult<Application> {
        let mut applications = self.applications.write().await;
        let Some(stored) = applications.get_mut(&application.id()) else {
            return Err(AppError::NotFound(format!(
                "application '{}' does not exist",
                application.id()
            )));
        };

        if stored.status() != expected {
            return Err(AppError::Conflict(format!(
                "application '{}' was expected in status '{}' but is '{}'",
                application.id(),
                expected.as_str(),
                stored.status().as_str()
            )));
        }

        *stored = application.clone();
        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use opportune_application::{ApplicationRepository, ApplicationScope};
    use opportune_core::{AppError, TaskId, UserId};
    use opportune_domain::{Application, ApplicationStatus};

    use super::InMemoryApplicationRepository;

    #[tokio::test]
    async fn duplicate_pair_is_a_conflict() {
        let repository = InMemoryApplicationRepository::new();
        let task = TaskId::new();
        let applicant = UserId::new();

        let first = repository
            .create(Application::submit(task, applicant, Utc::now()))
            .await;
        assert!(first.is_ok());

        let second = repository
            .create(Application::submit(task, applicant, Utc::now()))
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn scope_filters_records() {
        let repository = InMemoryApplicationRepository::new();
        let task = TaskId::new();
        let applicant = UserId::new();
        let other = UserId::new();

        for (scoped_task, scoped_applicant) in
            [(task, applicant), (task, other), (TaskId::new(), applicant)]
        {
            let created = repository
                .create(Application::submit(scoped_task, scoped_applicant, Utc::now()))
                .await;
            assert!(created.is_ok());
        }

        let by_task = repository
            .list_by_scope(&ApplicationScope::Task { task })
            .await;
        assert!(by_task.is_ok_and(|values| values.len() == 2));

        let own = repository
            .list_by_scope(&ApplicationScope::Own { applicant })
            .await;
        assert!(own.is_ok_and(|values| values.len() == 2));

        let own_for_task = repository
            .list_by_scope(&ApplicationScope::OwnForTask { applicant, task })
            .await;
        assert!(own_for_task.is_ok_and(|values| values.len() == 1));
    }

    #[tokio::test]
    async fn compare_and_set_rejects_a_stale_expectation() {
        let repository = InMemoryApplicationRepository::new();
        let Ok(stored) = repository
            .create(Application::submit(TaskId::new(), UserId::new(), Utc::now()))
            .await
        else {
            panic!("create succeeds");
        };

        let mut winner = stored.clone();
        winner.record_status(ApplicationStatus::Shortlisted, None, Utc::now());
        let won = repository
            .update_if_status(winner, ApplicationStatus::Submitted)
            .await;
        assert!(won.is_ok());

        let mut loser = stored;
        loser.record_status(ApplicationStatus::Shortlisted, None, Utc::now());
        let lost = repository
            .update_if_status(loser, ApplicationStatus::Submitted)
            .await;
        assert!(matches!(lost, Err(AppError::Conflict(_))));
    }
}
