//! Todo storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database, one table with storage-level uniqueness

mod memory;
mod sqlite;

pub use memory::InMemoryTodoStore;
pub use sqlite::SqliteTodoStore;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::todo::{Outcome, Todo, TodoPatch};

/// Infrastructure failure inside a store. Business-rule failures are
/// reported through [`Outcome`] instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("storage setup failed: {0}")]
    Setup(String),
}

/// Todo store trait - implemented by all storage backends.
///
/// `id` and `description` are unique across every row, soft-deleted ones
/// included.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// All rows, newest first (ties broken by description, descending).
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// Rows without a soft-delete mark, same order as [`find_all`](Self::find_all).
    async fn find_all_active(&self) -> Result<Vec<Todo>, StoreError>;

    /// Soft-deleted rows, most recently deleted first.
    async fn find_all_deleted(&self) -> Result<Vec<Todo>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Todo>, StoreError>;

    async fn find_by_description(&self, description: &str) -> Result<Option<Todo>, StoreError>;

    /// Insert `todo` as given. A duplicate id is reported before a duplicate
    /// description.
    async fn create(&self, todo: Todo) -> Result<Outcome<Todo>, StoreError>;

    /// Apply the mutable fields of `patch` and return the refreshed row.
    async fn update(&self, id: &str, patch: TodoPatch) -> Result<Outcome<Todo>, StoreError>;

    /// Remove the row and return the snapshot taken before removal.
    async fn delete(&self, id: &str) -> Result<Outcome<Todo>, StoreError>;
}

/// Newest first, ties broken by description (both descending).
pub(crate) fn sort_newest_first(todos: &mut [Todo]) {
    todos.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.description.cmp(&a.description))
    });
}

/// Todo store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TodoStoreType {
    Memory,
    #[default]
    Sqlite,
}

impl TodoStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }
}

/// Create a todo store based on type and database path.
pub async fn create_todo_store(
    store_type: TodoStoreType,
    db_path: PathBuf,
) -> Result<Box<dyn TodoStore>, StoreError> {
    match store_type {
        TodoStoreType::Memory => Ok(Box::new(InMemoryTodoStore::new())),
        TodoStoreType::Sqlite => {
            let store = SqliteTodoStore::new(db_path).await?;
            Ok(Box::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::{DESCRIPTION_EXISTS, ID_EXISTS, ID_MISSING};

    fn todo(id: &str, description: &str, created_at: &str) -> Todo {
        Todo {
            id: id.to_string(),
            description: description.to_string(),
            created_at: created_at.to_string(),
            deleted_at: None,
        }
    }

    /// Behaviour every backend has to share.
    async fn exercise_store(store: &dyn TodoStore) {
        assert!(store.find_all().await.unwrap().is_empty());

        let first = todo("a", "Buy groceries", "2026-01-01T00:00:00.000Z");
        assert_eq!(
            store.create(first.clone()).await.unwrap(),
            Outcome::Success(first.clone())
        );

        // same id, other description
        let dup_id = todo("a", "any another", "2026-01-02T00:00:00.000Z");
        assert_eq!(
            store.create(dup_id).await.unwrap(),
            Outcome::failure(ID_EXISTS)
        );

        // same description, other id
        let dup_description = todo("b", "Buy groceries", "2026-01-02T00:00:00.000Z");
        assert_eq!(
            store.create(dup_description).await.unwrap(),
            Outcome::failure(DESCRIPTION_EXISTS)
        );

        // both duplicated: id wins
        assert_eq!(
            store.create(first.clone()).await.unwrap(),
            Outcome::failure(ID_EXISTS)
        );
        assert_eq!(store.find_all().await.unwrap(), vec![first.clone()]);

        let second = todo("b", "Walk the dog", "2026-01-03T00:00:00.000Z");
        let third = todo("c", "Zebra crossing", "2026-01-03T00:00:00.000Z");
        store.create(second.clone()).await.unwrap();
        store.create(third.clone()).await.unwrap();
        let ids: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        assert_eq!(store.find_by_id("b").await.unwrap(), Some(second.clone()));
        assert_eq!(store.find_by_id("zz").await.unwrap(), None);
        assert_eq!(
            store.find_by_description("Walk the dog").await.unwrap(),
            Some(second.clone())
        );

        // update
        let updated = store
            .update("b", TodoPatch::description("Walk the cat"))
            .await
            .unwrap()
            .into_value()
            .expect("update succeeds");
        assert_eq!(updated.description, "Walk the cat");
        assert_eq!(updated.created_at, second.created_at);
        assert_eq!(
            store
                .update("b", TodoPatch::description("Buy groceries"))
                .await
                .unwrap(),
            Outcome::failure(DESCRIPTION_EXISTS)
        );
        assert_eq!(
            store
                .update("missing", TodoPatch::description("whatever"))
                .await
                .unwrap(),
            Outcome::failure(ID_MISSING)
        );

        // soft delete via update
        let stamp = "2026-02-01T00:00:00.000Z".to_string();
        let trashed = store
            .update("c", TodoPatch::deleted_at(Some(stamp.clone())))
            .await
            .unwrap()
            .into_value()
            .expect("trash succeeds");
        assert_eq!(trashed.deleted_at, Some(stamp));
        let active: Vec<String> = store
            .find_all_active()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(active, vec!["b", "a"]);
        let deleted = store.find_all_deleted().await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].id, "c");
        assert_eq!(store.find_all().await.unwrap().len(), 3);

        // un-trash
        store
            .update("c", TodoPatch::deleted_at(None))
            .await
            .unwrap();
        assert!(store.find_all_deleted().await.unwrap().is_empty());

        // hard delete
        assert_eq!(
            store.delete("missing").await.unwrap(),
            Outcome::failure(ID_MISSING)
        );
        assert_eq!(store.find_all().await.unwrap().len(), 3);
        assert_eq!(
            store.delete("a").await.unwrap(),
            Outcome::Success(first.clone())
        );
        assert_eq!(store.find_by_id("a").await.unwrap(), None);

        // a removed row can be re-inserted as-is
        assert_eq!(
            store.create(first.clone()).await.unwrap(),
            Outcome::Success(first)
        );
    }

    #[tokio::test]
    async fn test_memory_store_contract() {
        let store = InMemoryTodoStore::new();
        assert!(!store.is_persistent());
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_store_contract() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = SqliteTodoStore::new(temp.path().join("todos.sqlite3"))
            .await
            .expect("open sqlite store");
        assert!(store.is_persistent());
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn test_create_todo_store_selects_backend() {
        let temp = tempfile::tempdir().expect("tempdir");
        let memory = create_todo_store(TodoStoreType::Memory, temp.path().join("unused.db"))
            .await
            .unwrap();
        assert!(!memory.is_persistent());
        let sqlite = create_todo_store(TodoStoreType::Sqlite, temp.path().join("todos.db"))
            .await
            .unwrap();
        assert!(sqlite.is_persistent());
    }

    #[test]
    fn test_store_type_parse() {
        assert_eq!(TodoStoreType::from_str("memory"), TodoStoreType::Memory);
        assert_eq!(TodoStoreType::from_str("SQLite"), TodoStoreType::Sqlite);
        assert_eq!(TodoStoreType::from_str("db"), TodoStoreType::Sqlite);
        assert_eq!(TodoStoreType::from_str("postgres"), TodoStoreType::Sqlite);
    }
}
