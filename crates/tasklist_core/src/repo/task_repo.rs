//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Mirror collection mutations into one storage namespace.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Listing is deterministic: `sort_order ASC, id ASC`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskState, TaskValidationError};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Namespace used when configuration does not name one.
pub const DEFAULT_NAMESPACE: &str = "tasks-backbone";

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    sort_order,
    done,
    state
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage backend for one task namespace.
pub trait TaskRepository {
    /// Loads every task of the namespace ordered by `order`.
    fn load_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Loads one task by id.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Creates or updates one task.
    fn save_task(&self, task: &Task) -> RepoResult<()>;
    /// Deletes one task. Returns whether a stored row existed.
    fn delete_task(&self, id: TaskId) -> RepoResult<bool>;
    /// Deletes a batch of tasks atomically. Returns how many rows existed.
    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for &R {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        (**self).load_tasks()
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        (**self).get_task(id)
    }

    fn save_task(&self, task: &Task) -> RepoResult<()> {
        (**self).save_task(task)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        (**self).delete_task(id)
    }

    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize> {
        (**self).delete_tasks(ids)
    }
}

impl<R: TaskRepository + ?Sized> TaskRepository for Box<R> {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        (**self).load_tasks()
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        (**self).get_task(id)
    }

    fn save_task(&self, task: &Task) -> RepoResult<()> {
        (**self).save_task(task)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        (**self).delete_task(id)
    }

    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize> {
        (**self).delete_tasks(ids)
    }
}

/// SQLite-backed task repository scoped to one namespace.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
    namespace: String,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates a repository for the default namespace.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::try_with_namespace(conn, DEFAULT_NAMESPACE)
    }

    /// Creates a repository for `namespace` on a migrated connection.
    ///
    /// # Errors
    /// - `InvalidData` when `namespace` is blank.
    /// - `Db(UninitializedConnection | MissingRequiredTable)` when the
    ///   connection has not been bootstrapped through `db::open_*`.
    pub fn try_with_namespace(
        conn: &'conn Connection,
        namespace: impl AsRef<str>,
    ) -> RepoResult<Self> {
        let namespace = namespace.as_ref().trim();
        if namespace.is_empty() {
            return Err(RepoError::InvalidData(
                "storage namespace must not be blank".to_string(),
            ));
        }
        ensure_task_connection_ready(conn)?;
        Ok(Self {
            conn,
            namespace: namespace.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE namespace = ?1
             ORDER BY sort_order ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([self.namespace.as_str()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE namespace = ?1 AND id = ?2;"
        ))?;
        let mut rows = stmt.query(params![self.namespace.as_str(), id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn save_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                namespace,
                title,
                sort_order,
                done,
                state
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (namespace, id) DO UPDATE SET
                title = excluded.title,
                sort_order = excluded.sort_order,
                done = excluded.done,
                state = excluded.state,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                task.id.to_string(),
                self.namespace.as_str(),
                task.title.as_str(),
                task.order,
                bool_to_int(task.done),
                task.state.as_str(),
            ],
        )?;
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE namespace = ?1 AND id = ?2;",
            params![self.namespace.as_str(), id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM tasks WHERE namespace = ?1 AND id = ?2;")?;
            for id in ids {
                removed += stmt.execute(params![self.namespace.as_str(), id.to_string()])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid id value `{id_text}` in tasks.id")))?;

    let done = match row.get::<_, i64>("done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid done value `{other}` in tasks.done"
            )));
        }
    };

    let state_text: String = row.get("state")?;
    let state = TaskState::parse(&state_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid state `{state_text}` in tasks.state"))
    })?;

    let task = Task {
        id,
        title: row.get("title")?,
        order: row.get("sort_order")?,
        done,
        state,
    };
    task.validate()?;
    Ok(task)
}

fn ensure_task_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(DbError::UninitializedConnection {
            expected_version,
            actual_version,
        }
        .into());
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'tasks'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(DbError::MissingRequiredTable("tasks").into());
    }
    Ok(())
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
