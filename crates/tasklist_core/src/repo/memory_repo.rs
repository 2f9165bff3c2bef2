//! Process-local task repository.
//!
//! Used as the fallback backend when the database cannot be opened, so a
//! session keeps working without persistence.

use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoResult, TaskRepository};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory task repository.
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    tasks: RefCell<HashMap<TaskId, Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `tasks`.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let repo = Self::new();
        repo.tasks
            .borrow_mut()
            .extend(tasks.into_iter().map(|task| (task.id, task)));
        repo
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl TaskRepository for MemoryTaskRepository {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self.tasks.borrow().values().cloned().collect();
        tasks.sort_by(|left, right| left.order.cmp(&right.order).then(left.id.cmp(&right.id)));
        Ok(tasks)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        Ok(self.tasks.borrow().get(&id).cloned())
    }

    fn save_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        self.tasks.borrow_mut().insert(task.id, task.clone());
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        Ok(self.tasks.borrow_mut().remove(&id).is_some())
    }

    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize> {
        let mut tasks = self.tasks.borrow_mut();
        Ok(ids.iter().filter(|id| tasks.remove(*id).is_some()).count())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTaskRepository;
    use crate::model::task::Task;
    use crate::repo::task_repo::{RepoError, TaskRepository};

    #[test]
    fn load_orders_by_order_key() {
        let later = Task::new("later", 2);
        let first = Task::new("first", 1);
        let repo = MemoryTaskRepository::with_tasks([later.clone(), first.clone()]);

        let loaded = repo.load_tasks().unwrap();
        assert_eq!(loaded, vec![first, later]);
    }

    #[test]
    fn save_rejects_invalid_task() {
        let repo = MemoryTaskRepository::new();
        let err = repo.save_task(&Task::new(" ", 1)).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(repo.is_empty());
    }

    #[test]
    fn delete_reports_whether_row_existed() {
        let task = Task::new("walk dog", 1);
        let repo = MemoryTaskRepository::with_tasks([task.clone()]);

        assert!(repo.delete_task(task.id).unwrap());
        assert!(!repo.delete_task(task.id).unwrap());
        assert_eq!(repo.delete_tasks(&[task.id]).unwrap(), 0);
    }
}
