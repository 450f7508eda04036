//! Ports consumed by the application services.

mod application_store;
mod directory;
mod notifier;
mod profile_store;
mod task_store;

pub use application_store::{ApplicationRepository, ApplicationScope};
pub use directory::DirectoryRepository;
pub use notifier::{Notification, NotificationSeverity, Notifier};
pub use profile_store::{CompletionAcceptedHandler, ProfileRepository};
pub use task_store::TaskRepository;
