//! Single-task presentation.
//!
//! # Responsibility
//! - Render one task as a text line.
//! - Own the per-item `editing <-> viewing` state.
//!
//! # Invariants
//! - An item view never owns its task; it keeps the id and re-renders from
//!   the record handed to it.
//! - Committing a blank draft destroys the task.

use crate::model::task::{normalize_title, Task, TaskId};
use crate::repo::task_repo::TaskRepository;
use crate::service::task_collection::{CollectionError, CollectionResult, TaskCollection};

/// Edit state of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemMode {
    Viewing,
    Editing { draft: String },
}

/// Result of leaving edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemCommit {
    /// The item was not in edit mode.
    Unchanged,
    Saved(Task),
    /// Blank draft; the task was removed.
    Destroyed(Task),
}

/// Presentation state for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    task_id: TaskId,
    order: i64,
    done: bool,
    mode: ItemMode,
    line: String,
}

impl ItemView {
    pub fn new(task: &Task) -> Self {
        let mut view = Self {
            task_id: task.id,
            order: task.order,
            done: task.done,
            mode: ItemMode::Viewing,
            line: String::new(),
        };
        view.render(task);
        view
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    /// Completion flag as of the last render.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn mode(&self) -> &ItemMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, ItemMode::Editing { .. })
    }

    /// Last rendered line.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Re-renders from the current record.
    pub fn render(&mut self, task: &Task) -> &str {
        self.order = task.order;
        self.done = task.done;
        self.line = match &self.mode {
            ItemMode::Editing { draft } => format!("> {draft}"),
            ItemMode::Viewing => {
                let mark = if task.done { 'x' } else { ' ' };
                format!("[{mark}] {}", task.title)
            }
        };
        &self.line
    }

    /// Enters edit mode with the current title as the draft.
    pub fn begin_edit(&mut self, task: &Task) {
        self.mode = ItemMode::Editing {
            draft: task.title.clone(),
        };
        self.render(task);
    }

    /// Replaces the draft. Ignored outside edit mode.
    pub fn set_draft(&mut self, value: impl Into<String>) {
        if let ItemMode::Editing { draft } = &mut self.mode {
            *draft = value.into();
            self.line = format!("> {draft}");
        }
    }

    /// Leaves edit mode without saving.
    pub fn cancel(&mut self, task: &Task) {
        self.mode = ItemMode::Viewing;
        self.render(task);
    }

    /// Leaves edit mode, saving the draft or destroying the task when the
    /// draft is blank. Enter and blur both end up here.
    pub fn commit<R: TaskRepository>(
        &mut self,
        collection: &mut TaskCollection<R>,
    ) -> CollectionResult<ItemCommit> {
        let draft = match std::mem::replace(&mut self.mode, ItemMode::Viewing) {
            ItemMode::Viewing => return Ok(ItemCommit::Unchanged),
            ItemMode::Editing { draft } => draft,
        };

        if normalize_title(&draft).is_none() {
            return self.clear(collection).map(ItemCommit::Destroyed);
        }

        let task = collection.set_title(self.task_id, &draft)?;
        self.render(&task);
        Ok(ItemCommit::Saved(task))
    }

    /// Flips completion of the underlying task.
    pub fn toggle<R: TaskRepository>(
        &mut self,
        collection: &mut TaskCollection<R>,
    ) -> CollectionResult<Task> {
        let task = collection.toggle(self.task_id)?;
        self.render(&task);
        Ok(task)
    }

    /// Destroys the underlying task.
    pub fn clear<R: TaskRepository>(
        &self,
        collection: &mut TaskCollection<R>,
    ) -> CollectionResult<Task> {
        collection.destroy(self.task_id)
    }

    pub(crate) fn ensure_task<'a, R: TaskRepository>(
        &self,
        collection: &'a TaskCollection<R>,
    ) -> CollectionResult<&'a Task> {
        collection
            .get(self.task_id)
            .ok_or(CollectionError::NotFound(self.task_id))
    }
}
