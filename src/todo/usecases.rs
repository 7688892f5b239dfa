//! Create, update, and delete operations.
//!
//! Each operation validates through the factory, then hands off to the
//! injected store. Validation failures are returned untouched; store outcomes
//! are passed through as-is.

use std::sync::Arc;

use serde::Deserialize;

use super::factory::{make_new_validated_todo, make_update_validated_todo};
use super::{Outcome, Todo, TodoPatch, INVALID_ID};
use crate::api::todo_store::{StoreError, TodoStore};
use crate::util::{now_string, sanitize_str};

/// Which rows a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoFilter {
    #[default]
    All,
    Active,
    Deleted,
}

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TodoStore> {
        &self.store
    }

    pub async fn list_todos(&self, filter: TodoFilter) -> Result<Vec<Todo>, StoreError> {
        match filter {
            TodoFilter::All => self.store.find_all().await,
            TodoFilter::Active => self.store.find_all_active().await,
            TodoFilter::Deleted => self.store.find_all_deleted().await,
        }
    }

    pub async fn create_todo(&self, description: &str) -> Result<Outcome<Todo>, StoreError> {
        let todo = match make_new_validated_todo(description) {
            Outcome::Success(todo) => todo,
            Outcome::Failure(errors) => return Ok(Outcome::Failure(errors)),
        };
        self.store.create(todo).await
    }

    pub async fn update_todo(
        &self,
        id: &str,
        patch: TodoPatch,
    ) -> Result<Outcome<Todo>, StoreError> {
        let id = sanitize_str(id);
        let patch = match make_update_validated_todo(patch) {
            Outcome::Success(patch) => patch,
            Outcome::Failure(errors) => return Ok(Outcome::Failure(errors)),
        };
        self.store.update(&id, patch).await
    }

    /// Hard delete.
    pub async fn delete_todo(&self, id: &str) -> Result<Outcome<Todo>, StoreError> {
        let id = sanitize_str(id);
        if id.is_empty() {
            return Ok(Outcome::failure(INVALID_ID));
        }
        self.store.delete(&id).await
    }

    /// Soft delete: stamp `deleted_at` and keep the row.
    pub async fn trash_todo(&self, id: &str) -> Result<Outcome<Todo>, StoreError> {
        let id = sanitize_str(id);
        if id.is_empty() {
            return Ok(Outcome::failure(INVALID_ID));
        }
        self.store
            .update(&id, TodoPatch::deleted_at(Some(now_string())))
            .await
    }

    /// Put a previously deleted snapshot back, keeping its id and creation time.
    pub async fn restore_todo(&self, todo: Todo) -> Result<Outcome<Todo>, StoreError> {
        self.store.create(todo).await
    }
}
