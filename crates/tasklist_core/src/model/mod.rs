//! Task record model.
//!
//! # Responsibility
//! - Define the statically typed record owned by the task collection.
//! - Keep record-level validation next to the data it guards.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - `order` is the sole sort key for display.

pub mod task;
