use super::*;
use crate::authorization_service::AccessFlags;

impl ApplicationService {
    /// Derives the application record scope a principal is allowed to read.
    ///
    /// Decision table, in priority order:
    /// 1. task id given, own-only access: own applications for that task;
    /// 2. task id given, full access: the task's applications, gated on
    ///    global admin, matching organization, or task ownership;
    /// 3. no task id, global admin: everything;
    /// 4. no task id, full access, affiliated: applications of the
    ///    organization's tasks;
    /// 5. no task id, full access, independent: applications of the
    ///    principal's own tasks;
    /// 6. no task id, own-only access: own applications;
    /// 7. neither flag: precondition violation, the caller should already
    ///    have denied.
    ///
    /// Cases 4 and 5 issue two sequential reads (eligible task ids, then the
    /// applications) with no cross-read snapshot; a task created or
    /// reassigned in between may land on either side. Accepted staleness,
    /// not a correctness bug.
    pub async fn build_application_scope(
        &self,
        actor: &Principal,
        task_id: Option<TaskId>,
        flags: AccessFlags,
    ) -> AppResult<ApplicationScope> {
        if let Some(task_id) = task_id {
            if flags.full {
                return self.task_scope_with_full_access(actor, task_id).await;
            }

            if flags.own {
                return Ok(ApplicationScope::OwnForTask {
                    applicant: actor.id(),
                    task: task_id,
                });
            }

            return Err(scope_precondition_violation(actor));
        }

        if actor.is_global_admin() {
            return Ok(ApplicationScope::All);
        }

        if flags.full {
            let tasks = match actor.organization() {
                Some(organization) => {
                    self.tasks.list_ids_by_organization(organization).await?
                }
                None => self.tasks.list_ids_by_creator(actor.id()).await?,
            };

            return Ok(ApplicationScope::Tasks { tasks });
        }

        if flags.own {
            return Ok(ApplicationScope::Own {
                applicant: actor.id(),
            });
        }

        Err(scope_precondition_violation(actor))
    }

    async fn task_scope_with_full_access(
        &self,
        actor: &Principal,
        task_id: TaskId,
    ) -> AppResult<ApplicationScope> {
        let task = self.task_by_id(task_id).await?;

        if actor.is_global_admin() {
            return Ok(ApplicationScope::Task { task: task_id });
        }

        let affiliated = task.organization().is_some()
            && task.organization() == actor.organization();
        if !affiliated && task.creator() != actor.id() {
            return Err(AppError::Forbidden(format!(
                "principal '{}' may not read applications for task '{task_id}'",
                actor.id()
            )));
        }

        Ok(ApplicationScope::Task { task: task_id })
    }
}

fn scope_precondition_violation(actor: &Principal) -> AppError {
    AppError::Internal(format!(
        "application scope requested for principal '{}' without any read access",
        actor.id()
    ))
}
