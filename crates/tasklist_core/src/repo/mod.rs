//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the task collection writes through.
//! - Isolate SQLite query details from collection orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Task::validate()` before persistence.
//! - Deleting a missing task is not an error.

pub mod memory_repo;
pub mod task_repo;
