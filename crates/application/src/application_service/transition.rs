use opportune_domain::{ApplicationStatus, CompletionAccepted};

use super::*;
use crate::authorization_service::PermissionContext;

/// Extra payload accompanying a transition request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionInput {
    /// Reason stored verbatim; required for `CompletionRejected`, optional
    /// for `Rejected`, ignored elsewhere.
    pub reason: Option<String>,
}

impl ApplicationService {
    /// Moves an application to a target status.
    ///
    /// Every guard (permission, actor identity, funnel edge) runs before any
    /// write; the status write is conditioned on the status the guards saw,
    /// so a concurrently decided application loses with `Conflict`. Side
    /// effects (profile accrual, notifications) run after the commit and
    /// never roll it back.
    pub async fn transition(
        &self,
        actor: &Principal,
        application_id: ApplicationId,
        target: ApplicationStatus,
        input: TransitionInput,
    ) -> AppResult<Application> {
        let mut application = self.application_by_id(application_id).await?;
        let task = self.task_by_id(application.task()).await?;
        let current = application.status();

        let reason = self.guard_transition(actor, &application, &task, target, input)?;

        application.record_status(target, reason, Utc::now());
        let application = self.applications.update_if_status(application, current).await?;

        if target == ApplicationStatus::Completed {
            self.dispatch_completion(&application, &task).await;
        }

        self.notify_transition(actor, &application, &task, target).await;

        Ok(application)
    }

    /// Runs every pre-write guard and returns the reason to store, if any.
    fn guard_transition(
        &self,
        actor: &Principal,
        application: &Application,
        task: &Task,
        target: ApplicationStatus,
        input: TransitionInput,
    ) -> AppResult<Option<String>> {
        let current = application.status();
        let context = PermissionContext::for_task(task.creator(), task.organization());

        match target {
            ApplicationStatus::Shortlisted => {
                self.authorization.require_permission(
                    actor,
                    Permission::ApplicationShortlist,
                    Some(&context),
                )?;
                require_edge(current, target)?;
                Ok(None)
            }
            ApplicationStatus::Approved
            | ApplicationStatus::Rejected
            | ApplicationStatus::Offered => {
                let permission = match target {
                    ApplicationStatus::Approved => Permission::ApplicationApprove,
                    ApplicationStatus::Rejected => Permission::ApplicationReject,
                    _ => Permission::ApplicationOffer,
                };
                self.authorization
                    .require_permission(actor, permission, Some(&context))?;

                // Terminal statuses stay final for everyone; reopening a
                // completed application would re-run the funnel and accrue
                // the completion a second time.
                if current.is_terminal() {
                    return Err(AppError::InvalidTransition(format!(
                        "a {} application is final and cannot move to {}",
                        current.as_str(),
                        target.as_str()
                    )));
                }

                // Global admin explicitly bypasses the shortlist precondition.
                if !actor.is_global_admin() && current != ApplicationStatus::Shortlisted {
                    return Err(AppError::InvalidTransition(format!(
                        "cannot move a {} application to {}; it must be shortlisted first",
                        current.as_str(),
                        target.as_str()
                    )));
                }

                Ok((target == ApplicationStatus::Rejected)
                    .then(|| input.reason.clone())
                    .flatten())
            }
            ApplicationStatus::Accepted | ApplicationStatus::Declined => {
                if actor.id() != application.applicant() {
                    return Err(AppError::Forbidden(
                        "only the applicant may answer an offer".to_owned(),
                    ));
                }
                if current != ApplicationStatus::Offered {
                    return Err(AppError::InvalidTransition(format!(
                        "an offer can only be answered while offered, not {}",
                        current.as_str()
                    )));
                }
                Ok(None)
            }
            ApplicationStatus::CompletionRequested => {
                if actor.id() != application.applicant() {
                    return Err(AppError::Forbidden(
                        "only the applicant may request completion".to_owned(),
                    ));
                }
                if current != ApplicationStatus::Accepted {
                    return Err(AppError::InvalidTransition(format!(
                        "completion can only be requested from accepted, not {}",
                        current.as_str()
                    )));
                }
                Ok(None)
            }
            ApplicationStatus::Completed | ApplicationStatus::CompletionRejected => {
                if actor.id() != task.creator() && !actor.is_global_admin() {
                    return Err(AppError::Forbidden(
                        "only the task creator may decide a completion request".to_owned(),
                    ));
                }
                if current != ApplicationStatus::CompletionRequested {
                    return Err(AppError::InvalidTransition(format!(
                        "a completion verdict requires a pending completion request, not {}",
                        current.as_str()
                    )));
                }

                if target == ApplicationStatus::CompletionRejected {
                    let reason = input
                        .reason
                        .as_deref()
                        .map(str::trim)
                        .filter(|reason| !reason.is_empty());
                    if reason.is_none() {
                        return Err(AppError::Validation(
                            "completion rejection requires a non-empty reason".to_owned(),
                        ));
                    }

                    // Stored verbatim, not the trimmed copy used for the check.
                    return Ok(input.reason.clone());
                }

                Ok(None)
            }
            ApplicationStatus::Submitted => Err(AppError::InvalidTransition(
                "an application cannot return to submitted".to_owned(),
            )),
        }
    }

    /// Emits the completion event to the profile handler.
    ///
    /// The transition has already committed; a handler failure is logged and
    /// swallowed. The funnel guard prevents re-entering `Completed`, so the
    /// accrual cannot fire twice for one application.
    async fn dispatch_completion(&self, application: &Application, task: &Task) {
        let event = CompletionAccepted {
            application: application.id(),
            task: task.id(),
            task_title: task.title().to_owned(),
            applicant: application.applicant(),
            required_skills: task.required_skills().to_vec(),
            reward: task.reward().clone(),
        };

        if let Err(error) = self.completion_handler.handle(event).await {
            tracing::warn!(
                application_id = %application.id(),
                %error,
                "completion profile accrual failed"
            );
        }
    }

    async fn notify_transition(
        &self,
        actor: &Principal,
        application: &Application,
        task: &Task,
        target: ApplicationStatus,
    ) {
        let link = Some(format!("/applications/{}", application.id()));
        match target {
            // Shortlisting stays silent; the owner already saw the submission.
            ApplicationStatus::Shortlisted | ApplicationStatus::Submitted => {}
            ApplicationStatus::Approved => {
                self.deliver(
                    application.applicant(),
                    Notification {
                        title: "Application approved".to_owned(),
                        message: format!("Your application to '{}' was approved", task.title()),
                        severity: NotificationSeverity::Success,
                        link,
                    },
                )
                .await;
            }
            ApplicationStatus::Rejected => {
                let message = match application.rejection_reason() {
                    Some(reason) => format!(
                        "Your application to '{}' was rejected: {reason}",
                        task.title()
                    ),
                    None => format!("Your application to '{}' was rejected", task.title()),
                };
                self.deliver(
                    application.applicant(),
                    Notification {
                        title: "Application rejected".to_owned(),
                        message,
                        severity: NotificationSeverity::Warning,
                        link,
                    },
                )
                .await;
            }
            ApplicationStatus::Offered => {
                self.deliver(
                    application.applicant(),
                    Notification {
                        title: "Offer received".to_owned(),
                        message: format!("You were offered '{}'", task.title()),
                        severity: NotificationSeverity::Success,
                        link,
                    },
                )
                .await;
            }
            ApplicationStatus::Accepted
            | ApplicationStatus::Declined
            | ApplicationStatus::CompletionRequested => {
                let (title, severity) = match target {
                    ApplicationStatus::Accepted => ("Offer accepted", NotificationSeverity::Success),
                    ApplicationStatus::Declined => ("Offer declined", NotificationSeverity::Warning),
                    _ => ("Completion requested", NotificationSeverity::Info),
                };
                for recipient in self.task_owners(task) {
                    self.deliver(
                        recipient,
                        Notification {
                            title: title.to_owned(),
                            message: format!(
                                "{} updated the application to '{}'",
                                actor.display_name(),
                                task.title()
                            ),
                            severity,
                            link: link.clone(),
                        },
                    )
                    .await;
                }
            }
            ApplicationStatus::Completed => {
                self.deliver(
                    application.applicant(),
                    Notification {
                        title: "Completion accepted".to_owned(),
                        message: format!(
                            "'{}' is complete; your reward and skills were credited",
                            task.title()
                        ),
                        severity: NotificationSeverity::Success,
                        link,
                    },
                )
                .await;
            }
            ApplicationStatus::CompletionRejected => {
                let message = match application.rejection_reason() {
                    Some(reason) => {
                        format!("Completion of '{}' was rejected: {reason}", task.title())
                    }
                    None => format!("Completion of '{}' was rejected", task.title()),
                };
                self.deliver(
                    application.applicant(),
                    Notification {
                        title: "Completion rejected".to_owned(),
                        message,
                        severity: NotificationSeverity::Warning,
                        link,
                    },
                )
                .await;
            }
        }
    }
}

fn require_edge(current: ApplicationStatus, target: ApplicationStatus) -> AppResult<()> {
    if current.can_transition_to(target) {
        return Ok(());
    }

    Err(AppError::InvalidTransition(format!(
        "no transition from {} to {}",
        current.as_str(),
        target.as_str()
    )))
}
