//! Application services and ports.

#![forbid(unsafe_code)]

mod application_service;
mod authorization_service;
mod ports;
mod profile_completion_handler;
mod task_service;

pub use application_service::{ApplicationService, TransitionInput};
pub use authorization_service::{
    AccessFlags, AuthorizationService, GrantSource, PermissionContext, PermissionDecision,
};
pub use ports::{
    ApplicationRepository, ApplicationScope, CompletionAcceptedHandler, DirectoryRepository,
    Notification, NotificationSeverity, Notifier, ProfileRepository, TaskRepository,
};
pub use profile_completion_handler::ProfileCompletionHandler;
pub use task_service::{ApprovalAction, TaskService};
