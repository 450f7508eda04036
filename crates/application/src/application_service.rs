use std::sync::Arc;

use chrono::Utc;
use opportune_core::{AppError, AppResult, ApplicationId, TaskId, UserId};
use opportune_domain::{Application, Permission, Principal, Task, TaskStatus};

use crate::authorization_service::AuthorizationService;
use crate::ports::{
    ApplicationRepository, ApplicationScope, CompletionAcceptedHandler, Notification,
    NotificationSeverity, Notifier, TaskRepository,
};

mod scope;
mod transition;


pub use transition::TransitionInput;

/// Governs the hiring funnel: apply, guarded transitions, scoped reads.
#[derive(Clone)]
pub struct ApplicationService {
    authorization: AuthorizationService,
    tasks: Arc<dyn TaskRepository>,
    applications: Arc<dyn ApplicationRepository>,
    notifier: Arc<dyn Notifier>,
    completion_handler: Arc<dyn CompletionAcceptedHandler>,
}

impl ApplicationService {
    /// Creates the service from its collaborator ports.
    #[must_use]
    pub fn new(
        authorization: AuthorizationService,
        tasks: Arc<dyn TaskRepository>,
        applications: Arc<dyn ApplicationRepository>,
        notifier: Arc<dyn Notifier>,
        completion_handler: Arc<dyn CompletionAcceptedHandler>,
    ) -> Self {
        Self {
            authorization,
            tasks,
            applications,
            notifier,
            completion_handler,
        }
    }

    /// Applies the actor to a task.
    ///
    /// The task must be published and visible to the actor; a second
    /// application to the same task fails with `Conflict`. The task owner
    /// (and the approver, when distinct) is notified.
    pub async fn apply(&self, actor: &Principal, task_id: TaskId) -> AppResult<Application> {
        let task = self.visible_published_task(actor, task_id).await?;

        let application = Application::submit(task.id(), actor.id(), Utc::now());
        let application = self.applications.create(application).await?;

        for recipient in self.task_owners(&task) {
            self.deliver(
                recipient,
                Notification {
                    title: "New application".to_owned(),
                    message: format!("{} applied to '{}'", actor.display_name(), task.title()),
                    severity: NotificationSeverity::Info,
                    link: Some(format!("/applications/{}", application.id())),
                },
            )
            .await;
        }

        Ok(application)
    }

    /// Lists applications the actor may read, optionally scoped to one task.
    ///
    /// Resolves the explicit full/own-only pair and denies when neither is
    /// granted; the fetch never leaves the computed scope.
    pub async fn list_applications(
        &self,
        actor: &Principal,
        task_id: Option<TaskId>,
    ) -> AppResult<Vec<Application>> {
        let flags = self.authorization.access_flags(
            actor,
            Permission::ApplicationRead,
            Permission::ApplicationReadOwn,
        );
        if !flags.any() {
            return Err(AppError::Forbidden(format!(
                "principal '{}' may not read applications",
                actor.id()
            )));
        }

        let scope = self.build_application_scope(actor, task_id, flags).await?;
        self.applications.list_by_scope(&scope).await
    }

    /// Returns one application when it falls inside the actor's scope.
    ///
    /// Direct-id lookup re-checks the scope so it cannot leak records the
    /// list operation would hide.
    pub async fn get_application(
        &self,
        actor: &Principal,
        application_id: ApplicationId,
    ) -> AppResult<Application> {
        let application = self.application_by_id(application_id).await?;

        let flags = self.authorization.access_flags(
            actor,
            Permission::ApplicationRead,
            Permission::ApplicationReadOwn,
        );
        if !flags.any() {
            return Err(AppError::Forbidden(format!(
                "principal '{}' may not read applications",
                actor.id()
            )));
        }

        let scope = self
            .build_application_scope(actor, Some(application.task()), flags)
            .await?;
        if !scope.contains(&application) {
            return Err(AppError::Forbidden(format!(
                "application '{application_id}' is outside the caller's scope"
            )));
        }

        Ok(application)
    }

    async fn application_by_id(&self, application_id: ApplicationId) -> AppResult<Application> {
        match self.applications.find_by_id(application_id).await? {
            Some(application) => Ok(application),
            None => Err(AppError::NotFound(format!(
                "application '{application_id}' does not exist"
            ))),
        }
    }

    async fn task_by_id(&self, task_id: TaskId) -> AppResult<Task> {
        match self.tasks.find_by_id(task_id).await? {
            Some(task) => Ok(task),
            None => Err(AppError::NotFound(format!("task '{task_id}' does not exist"))),
        }
    }

    async fn visible_published_task(
        &self,
        actor: &Principal,
        task_id: TaskId,
    ) -> AppResult<Task> {
        let task = self.task_by_id(task_id).await?;

        let can_view_pending = actor.any_role_grants(Permission::TaskViewPending);
        let can_view_internal = actor.any_role_grants(Permission::TaskViewInternal);
        if !task.visible_to(Some(actor), can_view_pending, can_view_internal, false) {
            return Err(AppError::NotFound(format!("task '{task_id}' does not exist")));
        }

        if task.status() != TaskStatus::Published {
            return Err(AppError::Validation(format!(
                "task '{task_id}' is not open for applications"
            )));
        }

        Ok(task)
    }

    /// Returns the task creator plus the recorded approver when distinct.
    fn task_owners(&self, task: &Task) -> Vec<UserId> {
        let mut owners = vec![task.creator()];
        if let Some(approver) = task.approved_by()
            && approver != task.creator()
        {
            owners.push(approver);
        }

        owners
    }

    async fn deliver(&self, recipient: UserId, notification: Notification) {
        if let Err(error) = self.notifier.notify(recipient, notification).await {
            tracing::warn!(%recipient, %error, "notification delivery failed");
        }
    }
}
