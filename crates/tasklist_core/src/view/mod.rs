//! Text presentation of the task collection.
//!
//! # Responsibility
//! - Render tasks and summary counts without owning any task data.
//! - Map user input onto collection operations.
//!
//! # See also
//! - `service::events` for the change stream views consume.

use crate::service::task_collection::CollectionError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod item_view;
pub mod list_view;

pub type ViewResult<T> = Result<T, ViewError>;

/// Errors surfaced by view input handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// No item is displayed at this 1-based position.
    NoSuchPosition(usize),
    Collection(CollectionError),
}

impl Display for ViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSuchPosition(position) => write!(f, "no task at position {position}"),
            Self::Collection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ViewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoSuchPosition(_) => None,
            Self::Collection(err) => Some(err),
        }
    }
}

impl From<CollectionError> for ViewError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}
