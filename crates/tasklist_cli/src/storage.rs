//! Storage selection for one CLI session.
//!
//! Opens the configured SQLite namespace, or falls back to a process-local
//! store when the database is unusable.

use log::{info, warn};
use rusqlite::Connection;
use tasklist_core::db::open_db;
use tasklist_core::{AppConfig, MemoryTaskRepository, SqliteTaskRepository, TaskRepository};

pub struct Storage {
    conn: Option<Connection>,
    namespace: String,
    fallback: MemoryTaskRepository,
    warnings: Vec<String>,
}

impl Storage {
    pub fn open(config: &AppConfig) -> Self {
        let mut warnings = Vec::new();
        let conn = match open_db(&config.db_path) {
            Ok(conn) => match SqliteTaskRepository::try_with_namespace(&conn, &config.namespace) {
                Ok(_) => Some(conn),
                Err(err) => {
                    warnings.push(format!("storage unusable ({err}); changes will not be saved"));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!(
                    "cannot open `{}` ({err}); changes will not be saved",
                    config.db_path.display()
                ));
                None
            }
        };

        if conn.is_some() {
            info!("event=storage_select module=cli status=ok backend=sqlite");
        } else {
            warn!("event=storage_select module=cli status=degraded backend=memory");
        }

        Self {
            conn,
            namespace: config.namespace.clone(),
            fallback: MemoryTaskRepository::new(),
            warnings,
        }
    }

    /// Repository for the session; borrows the connection held here.
    pub fn repository(&self) -> Box<dyn TaskRepository + '_> {
        let sqlite = self.conn.as_ref().and_then(|conn| {
            SqliteTaskRepository::try_with_namespace(conn, &self.namespace).ok()
        });
        match sqlite {
            Some(repo) => Box::new(repo),
            None => Box::new(&self.fallback),
        }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::Storage;
    use tasklist_core::{AppConfig, TaskCollection};

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            db_path: dir.join("tasks.sqlite3"),
            log_dir: dir.join("logs"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn tasks_persist_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        {
            let storage = Storage::open(&config);
            assert!(storage.warnings().is_empty());
            let mut collection = TaskCollection::fetch(storage.repository());
            collection.add("buy milk").unwrap();
        }

        let storage = Storage::open(&config);
        let collection = TaskCollection::fetch(storage.repository());
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.tasks()[0].title, "buy milk");
    }

    #[test]
    fn unusable_database_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(&config.db_path, "this is not a sqlite database file, only text ".repeat(8))
            .unwrap();

        let storage = Storage::open(&config);
        assert_eq!(storage.warnings().len(), 1);

        let mut collection = TaskCollection::fetch(storage.repository());
        collection.add("buy milk").unwrap();
        assert_eq!(collection.len(), 1);
    }
}
