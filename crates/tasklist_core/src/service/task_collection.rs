//! Authoritative in-memory task collection.
//!
//! # Responsibility
//! - Hold every task of one namespace, sorted by `order`.
//! - Assign monotonic order keys to new tasks.
//! - Partition tasks by completion state.
//! - Mirror each mutation to the repository and notify subscribers.
//!
//! # Invariants
//! - `tasks` is always sorted by `order` ascending.
//! - A new task gets `max(order) + 1`, or `1` when the collection is empty.
//! - Storage failures never roll back the in-memory mutation; they are
//!   logged and emitted as `TaskEvent::StorageFailed`.
//! - Until one load succeeds, nothing is written to the repository. A store
//!   that could not be read must not receive orders computed from an empty
//!   collection.

use crate::model::task::{normalize_title, Task, TaskId};
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::service::events::{
    StorageOperation, Subscribers, Subscription, SubscriptionId, TaskEvent,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Errors from collection operations.
///
/// Storage problems are not represented here; see `TaskEvent::StorageFailed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Title is blank after trimming.
    EmptyTitle,
    NotFound(TaskId),
    /// The highest stored order leaves no room for another task.
    OrderExhausted,
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be blank"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::OrderExhausted => write!(f, "no order value left for a new task"),
        }
    }
}

impl Error for CollectionError {}

/// Summary counts for the footer line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub done: usize,
    pub remaining: usize,
}

/// Ordered task collection synchronized with one repository.
pub struct TaskCollection<R: TaskRepository> {
    repo: R,
    tasks: Vec<Task>,
    subscribers: Subscribers,
    /// Set once a load succeeded; writes are mirrored only while set.
    synced: bool,
}

impl<R: TaskRepository> TaskCollection<R> {
    /// Builds a collection from everything stored in `repo`.
    ///
    /// A failed read leaves the collection empty and detached from storage
    /// until a later `reload` succeeds; the failure is logged and replayed to
    /// the first subscriber.
    pub fn fetch(repo: R) -> Self {
        let mut collection = Self {
            repo,
            tasks: Vec::new(),
            subscribers: Subscribers::default(),
            synced: false,
        };
        collection.reload();
        collection
    }

    /// Re-reads the namespace and replaces the in-memory state.
    ///
    /// On read failure the current state is kept.
    pub fn reload(&mut self) {
        match self.repo.load_tasks() {
            Ok(mut tasks) => {
                tasks.sort_by_key(|task| task.order);
                info!(
                    "event=collection_fetch module=collection status=ok count={}",
                    tasks.len()
                );
                self.tasks = tasks;
                self.synced = true;
                self.subscribers.emit(TaskEvent::Reset);
            }
            Err(err) => {
                self.report_storage_failure(StorageOperation::Load, &err);
                if !self.synced {
                    warn!("event=storage_detach module=collection status=degraded");
                }
            }
        }
    }

    /// Whether mutations are currently mirrored to the repository.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Registers a new change subscriber.
    pub fn subscribe(&mut self) -> Subscription {
        self.subscribers.subscribe()
    }

    /// Detaches a subscriber. Returns `false` when the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// All tasks in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Zero-based display position of a task.
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Order key for the next created task.
    ///
    /// # Errors
    /// - `OrderExhausted` when the highest order is already `i64::MAX`.
    pub fn next_order(&self) -> CollectionResult<i64> {
        match self.tasks.iter().map(|task| task.order).max() {
            Some(max) => max.checked_add(1).ok_or(CollectionError::OrderExhausted),
            None => Ok(1),
        }
    }

    /// Tasks with `done = true`, in order.
    pub fn done(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.done).collect()
    }

    /// Tasks with `done = false`, in order.
    pub fn remaining(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| !task.done).collect()
    }

    pub fn stats(&self) -> TaskStats {
        let done = self.tasks.iter().filter(|task| task.done).count();
        TaskStats {
            total: self.tasks.len(),
            done,
            remaining: self.tasks.len() - done,
        }
    }

    /// Creates a task at the end of the order sequence.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank; nothing changes.
    /// - `OrderExhausted` when no order value is left; nothing changes.
    pub fn add(&mut self, title: &str) -> CollectionResult<Task> {
        let title = normalize_title(title).ok_or(CollectionError::EmptyTitle)?;
        let task = Task::new(title, self.next_order()?);

        let index = self.tasks.partition_point(|item| item.order <= task.order);
        self.tasks.insert(index, task.clone());
        info!(
            "event=task_add module=collection status=ok order={}",
            task.order
        );

        self.persist(&task);
        self.subscribers.emit(TaskEvent::Added(task.clone()));
        Ok(task)
    }

    /// Flips the completion flag of one task.
    pub fn toggle(&mut self, id: TaskId) -> CollectionResult<Task> {
        let task = self.task_mut(id)?;
        task.toggle();
        let task = task.clone();
        info!(
            "event=task_toggle module=collection status=ok order={} done={}",
            task.order, task.done
        );

        self.persist(&task);
        self.subscribers.emit(TaskEvent::Changed(task.clone()));
        Ok(task)
    }

    /// Replaces the title of one task.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank; the task is left untouched.
    /// - `NotFound` when `id` is not in the collection.
    pub fn set_title(&mut self, id: TaskId, title: &str) -> CollectionResult<Task> {
        let title = normalize_title(title).ok_or(CollectionError::EmptyTitle)?;
        let task = self.task_mut(id)?;
        if task.title == title {
            return Ok(task.clone());
        }
        task.rename(title);
        let task = task.clone();
        info!(
            "event=task_rename module=collection status=ok order={}",
            task.order
        );

        self.persist(&task);
        self.subscribers.emit(TaskEvent::Changed(task.clone()));
        Ok(task)
    }

    /// Removes one task from the collection and from storage.
    pub fn destroy(&mut self, id: TaskId) -> CollectionResult<Task> {
        let index = self.position(id).ok_or(CollectionError::NotFound(id))?;
        let task = self.tasks.remove(index);
        info!(
            "event=task_destroy module=collection status=ok order={}",
            task.order
        );

        if self.synced {
            if let Err(err) = self.repo.delete_task(id) {
                self.report_storage_failure(StorageOperation::Delete, &err);
            }
        }
        self.subscribers.emit(TaskEvent::Removed(task.clone()));
        Ok(task)
    }

    /// Destroys every completed task with one batched storage delete.
    ///
    /// Returns the removed tasks in their former order.
    pub fn clear_completed(&mut self) -> Vec<Task> {
        let (removed, kept): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|task| task.done);
        self.tasks = kept;
        if removed.is_empty() {
            return removed;
        }

        let ids: Vec<TaskId> = removed.iter().map(|task| task.id).collect();
        info!(
            "event=clear_completed module=collection status=ok count={}",
            ids.len()
        );
        if self.synced {
            if let Err(err) = self.repo.delete_tasks(&ids) {
                self.report_storage_failure(StorageOperation::Delete, &err);
            }
        }
        for task in &removed {
            self.subscribers.emit(TaskEvent::Removed(task.clone()));
        }
        removed
    }

    fn task_mut(&mut self, id: TaskId) -> CollectionResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(CollectionError::NotFound(id))
    }

    fn persist(&mut self, task: &Task) {
        if !self.synced {
            return;
        }
        if let Err(err) = self.repo.save_task(task) {
            self.report_storage_failure(StorageOperation::Save, &err);
        }
    }

    fn report_storage_failure(&mut self, operation: StorageOperation, err: &RepoError) {
        warn!(
            "event=storage_{} module=collection status=error error={}",
            operation, err
        );
        self.subscribers.emit(TaskEvent::StorageFailed {
            operation,
            message: err.to_string(),
        });
    }
}
