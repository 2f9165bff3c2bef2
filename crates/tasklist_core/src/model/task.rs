//! Task record.
//!
//! # Responsibility
//! - Define the canonical to-do entry kept by the collection.
//! - Provide explicit update helpers instead of free-form attribute bags.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is non-blank after trimming.
//! - `order` is `>= 1`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one task inside its storage namespace.
pub type TaskId = Uuid;

/// Lifecycle label carried by every task.
///
/// Only the default value exists. The label is persisted and round-tripped
/// but no logic reads or transitions it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Waiting,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "waiting" => Some(Self::Waiting),
            _ => None,
        }
    }
}

/// One to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Insertion sequence; the only sort key.
    pub order: i64,
    pub done: bool,
    #[serde(default)]
    pub state: TaskState,
}

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
    InvalidOrder(i64),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::InvalidOrder(order) => {
                write!(f, "task order must be >= 1, got {order}")
            }
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates a not-done task with a freshly generated id.
    ///
    /// The title is trimmed; callers are expected to reject blank input
    /// before constructing a record.
    pub fn new(title: impl AsRef<str>, order: i64) -> Self {
        Self::with_id(Uuid::new_v4(), title, order)
    }

    /// Creates a not-done task with a caller-provided id.
    pub fn with_id(id: TaskId, title: impl AsRef<str>, order: i64) -> Self {
        Self {
            id,
            title: title.as_ref().trim().to_string(),
            order,
            done: false,
            state: TaskState::default(),
        }
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.done = !self.done;
    }

    /// Replaces the title with its trimmed form.
    pub fn rename(&mut self, title: impl AsRef<str>) {
        self.title = title.as_ref().trim().to_string();
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - `BlankTitle` when the title is empty after trimming.
    /// - `InvalidOrder` when `order < 1`.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if self.order < 1 {
            return Err(TaskValidationError::InvalidOrder(self.order));
        }
        Ok(())
    }
}

/// Returns the trimmed title, or `None` when nothing but whitespace remains.
pub fn normalize_title(title: &str) -> Option<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
