use std::sync::Arc;

use chrono::Utc;
use opportune_core::{AppError, AppResult, TaskId, UserId};
use opportune_domain::{Permission, Principal, Task, TaskDraft, TaskStatus, TaskVisibility};

use crate::authorization_service::{AuthorizationService, PermissionContext};
use crate::ports::{DirectoryRepository, Notification, NotificationSeverity, Notifier, TaskRepository};

/// Approval verdict on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    /// Publish the task.
    Approve,
    /// Decline the task and archive it.
    Decline,
}

/// Governs task publication state and read-time visibility.
#[derive(Clone)]
pub struct TaskService {
    authorization: AuthorizationService,
    tasks: Arc<dyn TaskRepository>,
    directory: Arc<dyn DirectoryRepository>,
    notifier: Arc<dyn Notifier>,
}

impl TaskService {
    /// Creates the service from its collaborator ports.
    #[must_use]
    pub fn new(
        authorization: AuthorizationService,
        tasks: Arc<dyn TaskRepository>,
        directory: Arc<dyn DirectoryRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            authorization,
            tasks,
            directory,
            notifier,
        }
    }

    /// Creates a task from a draft.
    ///
    /// Requires `task.create`. The task is born `Published` when a role of
    /// the creator grants the auto-publish capability, else `Pending`.
    /// Creation never notifies anyone.
    pub async fn create(&self, actor: &Principal, draft: TaskDraft) -> AppResult<Task> {
        self.authorization
            .require_permission(actor, Permission::TaskCreate, None)?;

        let status = if actor.any_role_grants(Permission::TaskAutoPublish) {
            TaskStatus::Published
        } else {
            TaskStatus::Pending
        };

        let task = Task::from_draft(draft, actor.id(), status, Utc::now())?;
        self.tasks.create(task).await
    }

    /// Applies an approval verdict to a task.
    ///
    /// Requires `task.approve` with ownership/organization escalation from
    /// the task's context. Approve publishes any non-archived task; decline
    /// archives it. Both record the approver. The status write is conditioned
    /// on the status the guard saw, so a concurrent verdict loses with
    /// `Conflict` instead of silently overwriting.
    pub async fn approve(
        &self,
        actor: &Principal,
        task_id: TaskId,
        action: ApprovalAction,
    ) -> AppResult<Task> {
        let Some(mut task) = self.tasks.find_by_id(task_id).await? else {
            return Err(AppError::NotFound(format!("task '{task_id}' does not exist")));
        };

        let context = PermissionContext::for_task(task.creator(), task.organization());
        self.authorization
            .require_permission(actor, Permission::TaskApprove, Some(&context))?;

        if !actor.is_global_admin() {
            let authorized_for_task = match task.organization() {
                Some(organization) => actor.organization() == Some(organization),
                None => actor.id() == task.creator(),
            };

            if !authorized_for_task {
                return Err(AppError::Forbidden(format!(
                    "principal '{}' may not decide approvals for task '{task_id}'",
                    actor.id()
                )));
            }
        }

        let expected = task.status();
        match action {
            ApprovalAction::Approve => {
                if expected == TaskStatus::Archived {
                    return Err(AppError::InvalidTransition(
                        "an archived task cannot be published".to_owned(),
                    ));
                }

                let first_publish = expected == TaskStatus::Pending;
                task.mark_published(actor.id(), Utc::now());
                let task = self.tasks.update_if_status(task, expected).await?;

                if first_publish {
                    self.broadcast_publication(&task).await;
                }

                Ok(task)
            }
            ApprovalAction::Decline => {
                task.mark_archived(actor.id());
                self.tasks.update_if_status(task, expected).await
            }
        }
    }

    /// Returns one task when it is visible to the caller.
    ///
    /// Direct-id lookup applies the same visibility policy as listing; an
    /// out-of-scope task reads as absent.
    pub async fn get_task(
        &self,
        actor: Option<&Principal>,
        task_id: TaskId,
        include_archived: bool,
    ) -> AppResult<Task> {
        let Some(task) = self.tasks.find_by_id(task_id).await? else {
            return Err(AppError::NotFound(format!("task '{task_id}' does not exist")));
        };

        if !self.task_visible(actor, &task, include_archived) {
            return Err(AppError::NotFound(format!("task '{task_id}' does not exist")));
        }

        Ok(task)
    }

    /// Lists tasks visible to the caller.
    ///
    /// Archived tasks appear only for a global admin explicitly asking for
    /// them; an unauthenticated caller sees published global tasks only.
    pub async fn list_visible_tasks(
        &self,
        actor: Option<&Principal>,
        include_archived: bool,
    ) -> AppResult<Vec<Task>> {
        let tasks = self.tasks.list_all().await?;
        Ok(tasks
            .into_iter()
            .filter(|task| self.task_visible(actor, task, include_archived))
            .collect())
    }

    fn task_visible(&self, actor: Option<&Principal>, task: &Task, include_archived: bool) -> bool {
        let can_view_pending = actor
            .is_some_and(|principal| principal.any_role_grants(Permission::TaskViewPending));
        let can_view_internal = actor
            .is_some_and(|principal| principal.any_role_grants(Permission::TaskViewInternal));

        task.visible_to(actor, can_view_pending, can_view_internal, include_archived)
    }

    /// Broadcasts the first publication of a task.
    ///
    /// Global/external tasks go to every principal except the creator;
    /// internal tasks to organization members except the creator. Delivery
    /// failures are logged and swallowed; the publication has already
    /// committed.
    async fn broadcast_publication(&self, task: &Task) {
        let recipients = match (task.visibility(), task.organization()) {
            (TaskVisibility::Internal, Some(organization)) => {
                self.directory
                    .list_principal_ids_in_organization(organization)
                    .await
            }
            (TaskVisibility::Internal, None) => Ok(Vec::new()),
            (TaskVisibility::Global | TaskVisibility::External, _) => {
                self.directory.list_principal_ids().await
            }
        };

        let recipients = match recipients {
            Ok(recipients) => recipients,
            Err(error) => {
                tracing::warn!(task_id = %task.id(), %error, "publication broadcast skipped");
                return;
            }
        };

        for recipient in recipients {
            if recipient == task.creator() {
                continue;
            }

            self.deliver(
                recipient,
                Notification {
                    title: "New task available".to_owned(),
                    message: format!("'{}' is now open for applications", task.title()),
                    severity: NotificationSeverity::Info,
                    link: Some(format!("/tasks/{}", task.id())),
                },
            )
            .await;
        }
    }

    async fn deliver(&self, recipient: UserId, notification: Notification) {
        if let Err(error) = self.notifier.notify(recipient, notification).await {
            tracing::warn!(%recipient, %error, "notification delivery failed");
        }
    }
}
