//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod application;
mod event;
mod principal;
mod profile;
mod security;
mod task;

pub use application::{Application, ApplicationStatus};
pub use event::CompletionAccepted;
pub use principal::Principal;
pub use profile::{ExperienceRecord, Profile};
pub use security::{Permission, Role};
pub use task::{Reward, RewardKind, Skill, Task, TaskDraft, TaskStatus, TaskVisibility};
