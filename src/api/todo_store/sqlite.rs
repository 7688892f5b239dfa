//! SQLite-based todo store.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tokio::sync::Mutex;

use super::{StoreError, TodoStore};
use crate::todo::{Outcome, Todo, TodoPatch, DESCRIPTION_EXISTS, ID_EXISTS, ID_MISSING};

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS todo (
    id TEXT PRIMARY KEY NOT NULL,
    description TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_todo_created ON todo(created_at DESC, description DESC);
"#;

const SELECT_COLUMNS: &str = "SELECT id, description, created_at, deleted_at FROM todo";

pub struct SqliteTodoStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTodoStore {
    /// Open (or create) the database at `db_path` and bring its schema up to date.
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Setup(format!(
                    "Failed to create database dir {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            Self::run_migrations(&conn)?;
            tracing::info!(path = %db_path.display(), "Opened todo database");
            Ok::<_, StoreError>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run database migrations for existing databases.
    /// CREATE TABLE IF NOT EXISTS doesn't touch tables created by older
    /// versions, so missing columns and constraints are added here.
    fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
        let has_deleted_at_column: bool = conn
            .prepare("SELECT 1 FROM pragma_table_info('todo') WHERE name = 'deleted_at'")?
            .exists([])?;

        if !has_deleted_at_column {
            tracing::info!("Running migration: adding 'deleted_at' column to todo table");
            conn.execute("ALTER TABLE todo ADD COLUMN deleted_at TEXT", [])?;
        }

        // Older tables were created without UNIQUE on description.
        conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_todo_description ON todo(description)",
            [],
        )
        .map_err(|e| {
            StoreError::Setup(format!(
                "Failed to enforce unique descriptions (duplicate rows present?): {}",
                e
            ))
        })?;

        Ok(())
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await?
    }

    async fn query_list(&self, sql: String) -> Result<Vec<Todo>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let todos = stmt
                .query_map([], row_to_todo)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(todos)
        })
        .await
    }
}

fn row_to_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        description: row.get(1)?,
        created_at: row.get(2)?,
        deleted_at: row.get(3)?,
    })
}

fn select_by_id(conn: &Connection, id: &str) -> Result<Option<Todo>, StoreError> {
    let todo = conn
        .query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            row_to_todo,
        )
        .optional()?;
    Ok(todo)
}

fn select_by_description(conn: &Connection, description: &str) -> Result<Option<Todo>, StoreError> {
    let todo = conn
        .query_row(
            &format!("{} WHERE description = ?1", SELECT_COLUMNS),
            params![description],
            row_to_todo,
        )
        .optional()?;
    Ok(todo)
}

/// Map a uniqueness violation to its business message.
///
/// The table constraints are the authority on duplicates; the reads done
/// before writing only pick the message when both would collide.
fn duplicate_message(err: &rusqlite::Error) -> Option<&'static str> {
    match err {
        rusqlite::Error::SqliteFailure(e, message) if e.code == ErrorCode::ConstraintViolation => {
            match e.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Some(ID_EXISTS),
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    if message.as_deref().is_some_and(|m| m.contains("todo.id")) {
                        Some(ID_EXISTS)
                    } else {
                        Some(DESCRIPTION_EXISTS)
                    }
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn insert_todo(conn: &Connection, todo: Todo) -> Result<Outcome<Todo>, StoreError> {
    let inserted = conn.execute(
        "INSERT INTO todo (id, description, created_at, deleted_at) VALUES (?1, ?2, ?3, ?4)",
        params![todo.id, todo.description, todo.created_at, todo.deleted_at],
    );
    match inserted {
        Ok(_) => Ok(Outcome::Success(todo)),
        Err(e) => match duplicate_message(&e) {
            Some(message) => Ok(Outcome::failure(message)),
            None => Err(e.into()),
        },
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        self.query_list(format!(
            "{} ORDER BY created_at DESC, description DESC",
            SELECT_COLUMNS
        ))
        .await
    }

    async fn find_all_active(&self) -> Result<Vec<Todo>, StoreError> {
        self.query_list(format!(
            "{} WHERE deleted_at IS NULL ORDER BY created_at DESC, description DESC",
            SELECT_COLUMNS
        ))
        .await
    }

    async fn find_all_deleted(&self) -> Result<Vec<Todo>, StoreError> {
        self.query_list(format!(
            "{} WHERE deleted_at IS NOT NULL ORDER BY deleted_at DESC",
            SELECT_COLUMNS
        ))
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| select_by_id(conn, &id)).await
    }

    async fn find_by_description(&self, description: &str) -> Result<Option<Todo>, StoreError> {
        let description = description.to_string();
        self.with_conn(move |conn| select_by_description(conn, &description))
            .await
    }

    async fn create(&self, todo: Todo) -> Result<Outcome<Todo>, StoreError> {
        self.with_conn(move |conn| {
            if select_by_id(conn, &todo.id)?.is_some() {
                return Ok(Outcome::failure(ID_EXISTS));
            }
            if select_by_description(conn, &todo.description)?.is_some() {
                return Ok(Outcome::failure(DESCRIPTION_EXISTS));
            }
            insert_todo(conn, todo)
        })
        .await
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> Result<Outcome<Todo>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let Some(current) = select_by_id(conn, &id)? else {
                return Ok(Outcome::failure(ID_MISSING));
            };
            if patch.is_noop() {
                return Ok(Outcome::Success(current));
            }

            let touch_deleted_at = patch.deleted_at.is_some();
            let deleted_at = patch.deleted_at.clone().flatten();
            let updated = conn.execute(
                "UPDATE todo SET
                     description = COALESCE(?2, description),
                     deleted_at = CASE WHEN ?3 THEN ?4 ELSE deleted_at END
                 WHERE id = ?1",
                params![id, patch.description, touch_deleted_at, deleted_at],
            );
            if let Err(e) = updated {
                return match duplicate_message(&e) {
                    Some(message) => Ok(Outcome::failure(message)),
                    None => Err(e.into()),
                };
            }

            match select_by_id(conn, &id)? {
                Some(todo) => Ok(Outcome::Success(todo)),
                None => Ok(Outcome::failure(ID_MISSING)),
            }
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<Outcome<Todo>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let Some(snapshot) = select_by_id(conn, &id)? else {
                return Ok(Outcome::failure(ID_MISSING));
            };
            conn.execute("DELETE FROM todo WHERE id = ?1", params![id])?;
            Ok(Outcome::Success(snapshot))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: &str, description: &str) -> Todo {
        Todo {
            id: id.to_string(),
            description: description.to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            deleted_at: None,
        }
    }

    fn raw_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        SqliteTodoStore::run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_maps_primary_key_violation() {
        let conn = raw_connection();
        insert_todo(&conn, todo("a", "first")).unwrap();
        let outcome = insert_todo(&conn, todo("a", "second")).unwrap();
        assert_eq!(outcome, Outcome::failure(ID_EXISTS));
    }

    #[test]
    fn test_insert_maps_unique_description_violation() {
        let conn = raw_connection();
        insert_todo(&conn, todo("a", "first")).unwrap();
        // Skips the pre-insert reads, as a racing writer would.
        let outcome = insert_todo(&conn, todo("b", "first")).unwrap();
        assert_eq!(outcome, Outcome::failure(DESCRIPTION_EXISTS));
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM todo", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("todos.sqlite3");
        {
            let store = SqliteTodoStore::new(path.clone()).await.unwrap();
            store.create(todo("a", "Buy groceries")).await.unwrap();
        }
        let store = SqliteTodoStore::new(path).await.unwrap();
        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![todo("a", "Buy groceries")]);
    }

    #[tokio::test]
    async fn test_migrates_table_without_deleted_at() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("legacy.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE todo (
                     id TEXT PRIMARY KEY NOT NULL,
                     description TEXT NOT NULL,
                     created_at TEXT NOT NULL
                 );
                 INSERT INTO todo VALUES ('a', 'Legacy task', '2025-12-31T00:00:00.000Z');",
            )
            .unwrap();
        }

        let store = SqliteTodoStore::new(path).await.unwrap();
        let legacy = store.find_by_id("a").await.unwrap().expect("row kept");
        assert_eq!(legacy.deleted_at, None);

        // uniqueness now enforced by the added index
        let outcome = store.create(todo("b", "Legacy task")).await.unwrap();
        assert_eq!(outcome, Outcome::failure(DESCRIPTION_EXISTS));
    }

    #[tokio::test]
    async fn test_noop_update_returns_current_row() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SqliteTodoStore::new(temp.path().join("todos.sqlite3"))
            .await
            .unwrap();
        store.create(todo("a", "Buy groceries")).await.unwrap();
        let outcome = store.update("a", TodoPatch::default()).await.unwrap();
        assert_eq!(outcome, Outcome::Success(todo("a", "Buy groceries")));
    }
}
