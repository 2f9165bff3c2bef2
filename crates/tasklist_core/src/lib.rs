//! Core of the tasklist editor.
//! Owns the task collection, its storage mirror and the text views over it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use config::{AppConfig, ConfigError, ConfigResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError, LoggingStatus};
pub use model::task::{Task, TaskId, TaskState, TaskValidationError};
pub use repo::memory_repo::MemoryTaskRepository;
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskRepository, DEFAULT_NAMESPACE,
};
pub use service::events::{StorageOperation, Subscription, SubscriptionId, TaskEvent};
pub use service::task_collection::{CollectionError, CollectionResult, TaskCollection, TaskStats};
pub use view::item_view::{ItemCommit, ItemMode, ItemView};
pub use view::list_view::{ListFilter, ListView};
pub use view::{ViewError, ViewResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
