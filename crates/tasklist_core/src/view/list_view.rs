//! Root list presentation.
//!
//! # Responsibility
//! - Keep one `ItemView` per task, in display order.
//! - Translate user input (new-task submission, bulk clear, per-position
//!   commands) into collection operations.
//! - Render the list and the statistics footer.
//!
//! # Invariants
//! - The view learns about changes only by draining its subscription in
//!   `sync`; it never reads collection state behind the event stream except
//!   to rebuild on `Reset`.
//! - Positions are 1-based display positions.

use crate::model::task::{normalize_title, Task, TaskId};
use crate::repo::task_repo::TaskRepository;
use crate::service::events::{Subscription, TaskEvent};
use crate::service::task_collection::{TaskCollection, TaskStats};
use crate::view::item_view::{ItemCommit, ItemView};
use crate::view::{ViewError, ViewResult};

/// Completion filter applied when rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    All,
    Done,
    Remaining,
}

impl ListFilter {
    fn matches(self, item: &ItemView) -> bool {
        match self {
            Self::All => true,
            Self::Done => item.is_done(),
            Self::Remaining => !item.is_done(),
        }
    }
}

/// Top-level task list view.
#[derive(Debug)]
pub struct ListView {
    subscription: Subscription,
    items: Vec<ItemView>,
    stats: TaskStats,
    warnings: Vec<String>,
}

impl ListView {
    /// Subscribes to `collection` and renders its current content.
    pub fn new<R: TaskRepository>(collection: &mut TaskCollection<R>) -> Self {
        let subscription = collection.subscribe();
        let mut view = Self {
            subscription,
            items: Vec::new(),
            stats: TaskStats::default(),
            warnings: Vec::new(),
        };
        view.rebuild(collection);
        view.sync(collection);
        view
    }

    /// Applies pending collection events. Returns how many were applied.
    pub fn sync<R: TaskRepository>(&mut self, collection: &TaskCollection<R>) -> usize {
        let events = self.subscription.drain();
        let applied = events.len();
        for event in events {
            match event {
                TaskEvent::Reset => self.rebuild(collection),
                TaskEvent::Added(task) => self.add_one(&task),
                TaskEvent::Changed(task) => {
                    if let Some(item) = self.item_mut(task.id) {
                        item.render(&task);
                    }
                }
                TaskEvent::Removed(task) => self.items.retain(|item| item.task_id() != task.id),
                TaskEvent::StorageFailed { operation, message } => {
                    let mut warning = format!("storage {operation} failed: {message}");
                    if !collection.is_synced() {
                        warning.push_str("; changes will not be saved");
                    }
                    self.warnings.push(warning);
                }
            }
        }
        self.stats = collection.stats();
        applied
    }

    pub fn items(&self) -> &[ItemView] {
        &self.items
    }

    /// Item at a 1-based display position.
    pub fn item_at(&self, position: usize) -> Option<&ItemView> {
        position
            .checked_sub(1)
            .and_then(|index| self.items.get(index))
    }

    pub fn stats(&self) -> TaskStats {
        self.stats
    }

    /// Returns and clears storage warnings collected so far.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Handles submission of the new-task input. Blank input is ignored.
    pub fn create_on_enter<R: TaskRepository>(
        &mut self,
        collection: &mut TaskCollection<R>,
        input: &str,
    ) -> ViewResult<Option<Task>> {
        if normalize_title(input).is_none() {
            return Ok(None);
        }
        let task = collection.add(input)?;
        self.sync(collection);
        Ok(Some(task))
    }

    /// Destroys every completed task.
    pub fn clear_completed<R: TaskRepository>(
        &mut self,
        collection: &mut TaskCollection<R>,
    ) -> Vec<Task> {
        let removed = collection.clear_completed();
        self.sync(collection);
        removed
    }

    pub fn toggle_at<R: TaskRepository>(
        &mut self,
        collection: &mut TaskCollection<R>,
        position: usize,
    ) -> ViewResult<Task> {
        let index = self.index_of(position)?;
        let task = self.items[index].toggle(collection)?;
        self.sync(collection);
        Ok(task)
    }

    /// Puts the item at `position` into edit mode.
    pub fn begin_edit_at<R: TaskRepository>(
        &mut self,
        collection: &TaskCollection<R>,
        position: usize,
    ) -> ViewResult<()> {
        let index = self.index_of(position)?;
        let task = self.items[index].ensure_task(collection)?;
        self.items[index].begin_edit(task);
        Ok(())
    }

    /// Replaces the draft of an item already in edit mode.
    pub fn set_draft_at(&mut self, position: usize, value: impl Into<String>) -> ViewResult<()> {
        let index = self.index_of(position)?;
        self.items[index].set_draft(value);
        Ok(())
    }

    /// Commits the edit of the item at `position`.
    pub fn commit_at<R: TaskRepository>(
        &mut self,
        collection: &mut TaskCollection<R>,
        position: usize,
    ) -> ViewResult<ItemCommit> {
        let index = self.index_of(position)?;
        let commit = self.items[index].commit(collection)?;
        self.sync(collection);
        Ok(commit)
    }

    /// Full edit cycle: enter edit mode, set the draft and commit.
    pub fn edit_at<R: TaskRepository>(
        &mut self,
        collection: &mut TaskCollection<R>,
        position: usize,
        value: &str,
    ) -> ViewResult<ItemCommit> {
        self.begin_edit_at(collection, position)?;
        self.set_draft_at(position, value)?;
        self.commit_at(collection, position)
    }

    pub fn destroy_at<R: TaskRepository>(
        &mut self,
        collection: &mut TaskCollection<R>,
        position: usize,
    ) -> ViewResult<Task> {
        let index = self.index_of(position)?;
        let task = self.items[index].clear(collection)?;
        self.sync(collection);
        Ok(task)
    }

    /// Renders numbered item lines followed by the statistics footer.
    pub fn render(&self) -> String {
        self.render_filtered(ListFilter::All)
    }

    /// Renders items matching `filter`, keeping their full-list positions so
    /// positional commands stay valid.
    pub fn render_filtered(&self, filter: ListFilter) -> String {
        if self.items.is_empty() {
            return "no tasks".to_string();
        }

        let width = self.items.len().to_string().len();
        let mut out = String::new();
        for (index, item) in self.items.iter().enumerate() {
            if filter.matches(item) {
                out.push_str(&format!("{:>width$}. {}\n", index + 1, item.line()));
            }
        }
        out.push_str(&render_footer(self.stats));
        out
    }

    fn rebuild<R: TaskRepository>(&mut self, collection: &TaskCollection<R>) {
        self.items = collection.tasks().iter().map(ItemView::new).collect();
    }

    fn add_one(&mut self, task: &Task) {
        if self.item_mut(task.id).is_some() {
            return;
        }
        let index = self.items.partition_point(|item| item.order() <= task.order);
        self.items.insert(index, ItemView::new(task));
    }

    fn item_mut(&mut self, id: TaskId) -> Option<&mut ItemView> {
        self.items.iter_mut().find(|item| item.task_id() == id)
    }

    fn index_of(&self, position: usize) -> ViewResult<usize> {
        match position.checked_sub(1) {
            Some(index) if index < self.items.len() => Ok(index),
            _ => Err(ViewError::NoSuchPosition(position)),
        }
    }
}

/// Footer line: remaining count and, when any, the clear-completed hint.
pub fn render_footer(stats: TaskStats) -> String {
    let noun = if stats.remaining == 1 { "item" } else { "items" };
    let mut footer = format!("{} {noun} left", stats.remaining);
    if stats.done > 0 {
        footer.push_str(&format!(" | clear completed ({})", stats.done));
    }
    footer
}

#[cfg(test)]
mod tests {
    use super::{render_footer, ListFilter, ListView};
    use crate::repo::memory_repo::MemoryTaskRepository;
    use crate::service::task_collection::{TaskCollection, TaskStats};

    #[test]
    fn footer_pluralizes_and_hides_clear_hint_when_nothing_done() {
        let one = TaskStats {
            total: 1,
            done: 0,
            remaining: 1,
        };
        assert_eq!(render_footer(one), "1 item left");

        let mixed = TaskStats {
            total: 3,
            done: 1,
            remaining: 2,
        };
        assert_eq!(render_footer(mixed), "2 items left | clear completed (1)");
    }

    #[test]
    fn filtered_render_keeps_full_list_positions() {
        let mut collection = TaskCollection::fetch(MemoryTaskRepository::new());
        collection.add("buy milk").unwrap();
        let dog = collection.add("walk dog").unwrap();
        collection.toggle(dog.id).unwrap();
        let view = ListView::new(&mut collection);

        assert_eq!(
            view.render_filtered(ListFilter::Done),
            "2. [x] walk dog\n1 item left | clear completed (1)"
        );
        assert_eq!(
            view.render_filtered(ListFilter::Remaining),
            "1. [ ] buy milk\n1 item left | clear completed (1)"
        );
    }
}
