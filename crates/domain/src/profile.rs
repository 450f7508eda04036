use chrono::{DateTime, Utc};
use opportune_core::{TaskId, UserId};
use serde::{Deserialize, Serialize};

use crate::task::{Reward, Skill};

/// One completed task recorded on an applicant's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    /// Completed task.
    pub task: TaskId,
    /// Task title at completion time.
    pub task_title: String,
    /// Reward granted for the completion.
    pub reward: Reward,
    /// Completion verification timestamp.
    pub earned_at: DateTime<Utc>,
}

/// An applicant's accrued skills and experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    user: UserId,
    skills: Vec<Skill>,
    experience: Vec<ExperienceRecord>,
}

impl Profile {
    /// Creates an empty profile for a user.
    #[must_use]
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            skills: Vec::new(),
            experience: Vec::new(),
        }
    }

    /// Returns the owning user.
    #[must_use]
    pub fn user(&self) -> UserId {
        self.user
    }

    /// Returns the accrued skills.
    #[must_use]
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Returns the experience records, oldest first.
    #[must_use]
    pub fn experience(&self) -> &[ExperienceRecord] {
        &self.experience
    }

    /// Merges skills into the profile, deduplicating by normalized name.
    ///
    /// Skill names are already lower-cased at construction, so equality on
    /// the name is the dedupe key. Returns how many skills were added.
    pub fn merge_skills(&mut self, incoming: &[Skill]) -> usize {
        let mut added = 0;
        for skill in incoming {
            if !self.skills.iter().any(|existing| existing.name() == skill.name()) {
                self.skills.push(skill.clone());
                added += 1;
            }
        }

        added
    }

    /// Appends one experience record.
    pub fn append_experience(&mut self, record: ExperienceRecord) {
        self.experience.push(record);
    }
}

#[cfg(test)]
mod tests {
    use opportune_core::UserId;

    use super::Profile;
    use crate::task::Skill;

    fn skills(names: &[&str]) -> Vec<Skill> {
        names
            .iter()
            .filter_map(|name| Skill::new(*name).ok())
            .collect()
    }

    #[test]
    fn merge_skips_already_known_skills() {
        let mut profile = Profile::new(UserId::new());
        assert_eq!(profile.merge_skills(&skills(&["rust", "sql"])), 2);
        assert_eq!(profile.merge_skills(&skills(&["SQL", "writing"])), 1);
        assert_eq!(profile.skills().len(), 3);
    }

    #[test]
    fn merge_on_empty_incoming_is_a_noop() {
        let mut profile = Profile::new(UserId::new());
        assert_eq!(profile.merge_skills(&[]), 0);
        assert!(profile.skills().is_empty());
    }
}
