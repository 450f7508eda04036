use async_trait::async_trait;
use opportune_core::{AppResult, UserId};
use opportune_domain::{CompletionAccepted, ExperienceRecord, Profile, Skill};

/// Port for applicant profile persistence.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Finds a profile by owning user.
    async fn find_profile(&self, user: UserId) -> AppResult<Option<Profile>>;

    /// Merges skills into the user's profile, deduplicating by normalized
    /// name; returns how many skills were added.
    async fn merge_skills(&self, user: UserId, skills: &[Skill]) -> AppResult<usize>;

    /// Appends one experience record to the user's profile.
    async fn append_experience(&self, user: UserId, record: ExperienceRecord) -> AppResult<()>;
}

/// Consumer of the completion-accepted domain event.
///
/// Keeps the cross-aggregate profile mutation independent from the hiring
/// funnel transition; the transition commits first and never blocks on the
/// handler's success.
#[async_trait]
pub trait CompletionAcceptedHandler: Send + Sync {
    /// Applies one completion event.
    async fn handle(&self, event: CompletionAccepted) -> AppResult<()>;
}
