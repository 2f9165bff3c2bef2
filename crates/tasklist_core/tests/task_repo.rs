use rusqlite::Connection;
use tasklist_core::db::{open_db, open_db_in_memory, DbError};
use tasklist_core::{RepoError, SqliteTaskRepository, Task, TaskRepository, TaskState};

#[test]
fn save_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("buy milk", 1);
    repo.save_task(&task).unwrap();

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded, task);
    assert_eq!(loaded.state, TaskState::Waiting);
}

#[test]
fn save_existing_task_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut task = Task::new("buy milk", 1);
    repo.save_task(&task).unwrap();

    task.toggle();
    task.rename("buy oat milk");
    repo.save_task(&task).unwrap();

    let loaded = repo.load_tasks().unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded[0].done);
    assert_eq!(loaded[0].title, "buy oat milk");
}

#[test]
fn load_orders_by_order_key_not_insertion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let third = Task::new("third", 3);
    let first = Task::new("first", 1);
    let second = Task::new("second", 2);
    for task in [&third, &first, &second] {
        repo.save_task(task).unwrap();
    }

    let titles: Vec<String> = repo
        .load_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, ["first", "second", "third"]);
}

#[test]
fn namespaces_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let home = SqliteTaskRepository::try_with_namespace(&conn, "home").unwrap();
    let work = SqliteTaskRepository::try_with_namespace(&conn, "work").unwrap();

    let task = Task::new("water plants", 1);
    home.save_task(&task).unwrap();

    assert_eq!(home.load_tasks().unwrap().len(), 1);
    assert!(work.load_tasks().unwrap().is_empty());
    assert!(work.get_task(task.id).unwrap().is_none());
    assert!(!work.delete_task(task.id).unwrap());
    assert_eq!(home.namespace(), "home");
}

#[test]
fn blank_namespace_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let err = SqliteTaskRepository::try_with_namespace(&conn, "  ")
        .err()
        .unwrap();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("walk dog", 1);
    repo.save_task(&task).unwrap();

    assert!(repo.delete_task(task.id).unwrap());
    assert!(!repo.delete_task(task.id).unwrap());
    assert!(repo.get_task(task.id).unwrap().is_none());
}

#[test]
fn delete_tasks_removes_batch_and_counts_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let keep = Task::new("keep", 1);
    let drop_a = Task::new("drop a", 2);
    let drop_b = Task::new("drop b", 3);
    for task in [&keep, &drop_a, &drop_b] {
        repo.save_task(task).unwrap();
    }

    let missing = Task::new("never stored", 4);
    let removed = repo
        .delete_tasks(&[drop_a.id, drop_b.id, missing.id])
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(repo.load_tasks().unwrap(), vec![keep]);
    assert_eq!(repo.delete_tasks(&[]).unwrap(), 0);
}

#[test]
fn validation_failure_blocks_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let blank = Task::new("   ", 1);
    assert!(matches!(
        repo.save_task(&blank).unwrap_err(),
        RepoError::Validation(_)
    ));

    let zero_order = Task::new("fine title", 0);
    assert!(matches!(
        repo.save_task(&zero_order).unwrap_err(),
        RepoError::Validation(_)
    ));
    assert!(repo.load_tasks().unwrap().is_empty());
}

#[test]
fn invalid_persisted_rows_are_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO tasks (id, namespace, title, sort_order, done, state)
         VALUES ('not-a-uuid', 'tasks-backbone', 'broken', 1, 0, 'waiting');",
        [],
    )
    .unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo.load_tasks().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("not-a-uuid")));
}

#[test]
fn unknown_state_label_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let task = Task::new("walk dog", 1);
    conn.execute(
        "INSERT INTO tasks (id, namespace, title, sort_order, done, state)
         VALUES (?1, 'tasks-backbone', 'walk dog', 1, 0, 'running');",
        [task.id.to_string()],
    )
    .unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo.get_task(task.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("running")));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteTaskRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::Db(DbError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
}

#[test]
fn tasks_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasklist.sqlite3");
    let task = Task::new("buy milk", 1);

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        repo.save_task(&task).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    assert_eq!(repo.load_tasks().unwrap(), vec![task]);
}
