use chrono::{DateTime, Utc};
use opportune_core::{ApplicationId, TaskId, UserId};
use serde::{Deserialize, Serialize};

/// Status of an application along the hiring funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Created on apply.
    Submitted,
    /// Marked promising by the task owner.
    Shortlisted,
    /// Approved without an offer step.
    Approved,
    /// Rejected by the task owner.
    Rejected,
    /// Offered the task.
    Offered,
    /// Offer accepted by the applicant.
    Accepted,
    /// Offer declined by the applicant.
    Declined,
    /// Applicant reported the work as done.
    CompletionRequested,
    /// Completion verified; rewards and skills accrue.
    Completed,
    /// Completion rejected with a reason; terminal.
    CompletionRejected,
}

impl ApplicationStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Shortlisted => "shortlisted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Offered => "offered",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::CompletionRequested => "completion_requested",
            Self::Completed => "completed",
            Self::CompletionRejected => "completion_rejected",
        }
    }

    /// Returns whether the funnel graph has an edge from `self` to `target`.
    ///
    /// The graph is directed and acyclic; `CompletionRejected` has no
    /// successors (terminal, pending product clarification).
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Submitted, Self::Shortlisted)
                | (Self::Shortlisted, Self::Approved)
                | (Self::Shortlisted, Self::Rejected)
                | (Self::Shortlisted, Self::Offered)
                | (Self::Offered, Self::Accepted)
                | (Self::Offered, Self::Declined)
                | (Self::Accepted, Self::CompletionRequested)
                | (Self::CompletionRequested, Self::Completed)
                | (Self::CompletionRequested, Self::CompletionRejected)
        )
    }

    /// Returns whether no further transitions leave this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Rejected | Self::Declined | Self::Completed
                | Self::CompletionRejected
        )
    }
}

/// One applicant's application to one task; unique per (task, applicant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    task: TaskId,
    applicant: UserId,
    status: ApplicationStatus,
    rejection_reason: Option<String>,
    submitted_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Creates a freshly submitted application.
    #[must_use]
    pub fn submit(task: TaskId, applicant: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ApplicationId::new(),
            task,
            applicant,
            status: ApplicationStatus::Submitted,
            rejection_reason: None,
            submitted_at: now,
            decided_at: None,
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the applied-to task.
    #[must_use]
    pub fn task(&self) -> TaskId {
        self.task
    }

    /// Returns the applying principal's identifier.
    #[must_use]
    pub fn applicant(&self) -> UserId {
        self.applicant
    }

    /// Returns the funnel status.
    #[must_use]
    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    /// Returns the rejection reason; meaningful only in `Rejected` and
    /// `CompletionRejected`.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns the timestamp of the most recent status decision.
    #[must_use]
    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    /// Records a status change; guards have already run.
    ///
    /// Stores the reason verbatim when one is supplied.
    pub fn record_status(
        &mut self,
        status: ApplicationStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        if reason.is_some() {
            self.rejection_reason = reason;
        }
        self.decided_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus;

    #[test]
    fn funnel_edges_are_directed() {
        assert!(ApplicationStatus::Submitted.can_transition_to(ApplicationStatus::Shortlisted));
        assert!(!ApplicationStatus::Shortlisted.can_transition_to(ApplicationStatus::Submitted));
        assert!(ApplicationStatus::Offered.can_transition_to(ApplicationStatus::Declined));
        assert!(!ApplicationStatus::Submitted.can_transition_to(ApplicationStatus::Offered));
    }

    #[test]
    fn completion_rejected_is_terminal() {
        for target in [
            ApplicationStatus::CompletionRequested,
            ApplicationStatus::Accepted,
            ApplicationStatus::Completed,
        ] {
            assert!(!ApplicationStatus::CompletionRejected.can_transition_to(target));
        }
        assert!(ApplicationStatus::CompletionRejected.is_terminal());
    }

    #[test]
    fn completed_cannot_be_reentered() {
        assert!(!ApplicationStatus::Completed.can_transition_to(ApplicationStatus::Completed));
        assert!(!ApplicationStatus::Accepted.can_transition_to(ApplicationStatus::Completed));
        assert!(
            ApplicationStatus::CompletionRequested.can_transition_to(ApplicationStatus::Completed)
        );
    }
}
