//! Adapter implementations of the application ports.

#![forbid(unsafe_code)]

mod in_memory_application_repository;
mod in_memory_directory;
mod in_memory_profile_repository;
mod in_memory_task_repository;
mod tracing_notifier;

pub use in_memory_application_repository::InMemoryApplicationRepository;
pub use in_memory_directory::InMemoryDirectory;
pub use in_memory_profile_repository::InMemoryProfileRepository;
pub use in_memory_task_repository::InMemoryTaskRepository;
pub use tracing_notifier::{RecordingNotifier, TracingNotifier};
