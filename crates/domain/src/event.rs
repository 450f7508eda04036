use opportune_core::{ApplicationId, TaskId, UserId};
use serde::{Deserialize, Serialize};

use crate::task::{Reward, Skill};

/// Domain event emitted when a completion request is verified.
///
/// Decouples the hiring-funnel transition from the profile mutation: the
/// lifecycle commits the status change and emits this event; an independent
/// handler accrues skills and experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionAccepted {
    /// Completed application.
    pub application: ApplicationId,
    /// Completed task.
    pub task: TaskId,
    /// Task title at completion time.
    pub task_title: String,
    /// Applicant whose profile accrues the completion.
    pub applicant: UserId,
    /// Skills the task required.
    pub required_skills: Vec<Skill>,
    /// Reward granted for the completion.
    pub reward: Reward,
}
