//! Collection orchestration over the repository layer.
//!
//! # Responsibility
//! - Own the authoritative task set and its ordering rules.
//! - Keep views decoupled from storage through explicit change events.

pub mod events;
pub mod task_collection;
