use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use opportune_core::AppResult;
use opportune_domain::{CompletionAccepted, ExperienceRecord};

use crate::ports::{CompletionAcceptedHandler, ProfileRepository};

/// Accrues skills and experience on the applicant's profile when a
/// completion is verified.
///
/// Runs decoupled from the hiring-funnel transition: the transition has
/// already committed by the time this handler sees the event.
#[derive(Clone)]
pub struct ProfileCompletionHandler {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileCompletionHandler {
    /// Creates the handler over a profile store.
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl CompletionAcceptedHandler for ProfileCompletionHandler {
    async fn handle(&self, event: CompletionAccepted) -> AppResult<()> {
        self.profiles
            .merge_skills(event.applicant, &event.required_skills)
            .await?;

        self.profiles
            .append_experience(
                event.applicant,
                ExperienceRecord {
                    task: event.task,
                    task_title: event.task_title,
                    reward: event.reward,
                    earned_at: Utc::now(),
                },
            )
            .await
    }
}
