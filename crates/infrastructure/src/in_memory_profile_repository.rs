use std::collections::HashMap;

use async_trait::async_trait;
use opportune_application::ProfileRepository;
use opportune_core::{AppResult, UserId};
use opportune_domain::{ExperienceRecord, Profile, Skill};
use tokio::sync::RwLock;

/// In-memory profile repository implementation.
///
/// Profiles are created lazily on first accrual.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<UserId, Profile>>,
}

impl InMemoryProfileRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_profile(&self, user: UserId) -> AppResult<Option<Profile>> {
        Ok(self.profiles.read().await.get(&user).cloned())
    }

    async fn merge_skills(&self, user: UserId, skills: &[Skill]) -> AppResult<usize> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(user).or_insert_with(|| Profile::new(user));
        Ok(profile.merge_skills(skills))
    }

    async fn append_experience(&self, user: UserId, record: ExperienceRecord) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(user).or_insert_with(|| Profile::new(user));
        profile.append_experience(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use opportune_application::ProfileRepository;
    use opportune_core::UserId;
    use opportune_domain::Skill;

    use super::InMemoryProfileRepository;

    #[tokio::test]
    async fn merge_creates_the_profile_lazily() {
        let repository = InMemoryProfileRepository::new();
        let user = UserId::new();
        let skills: Vec<Skill> = [Skill::new("welding")].into_iter().flatten().collect();

        let added = repository.merge_skills(user, &skills).await;
        assert_eq!(added.ok(), Some(1));

        let again = repository.merge_skills(user, &skills).await;
        assert_eq!(again.ok(), Some(0));
    }
}
