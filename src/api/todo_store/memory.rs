//! In-memory todo store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{sort_newest_first, StoreError, TodoStore};
use crate::todo::{Outcome, Todo, TodoPatch, DESCRIPTION_EXISTS, ID_EXISTS, ID_MISSING};

#[derive(Clone)]
pub struct InMemoryTodoStore {
    todos: Arc<RwLock<HashMap<String, Todo>>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self {
            todos: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn collect_where(&self, keep: impl Fn(&Todo) -> bool) -> Vec<Todo> {
        self.todos
            .read()
            .await
            .values()
            .filter(|todo| keep(todo))
            .cloned()
            .collect()
    }
}

impl Default for InMemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        let mut todos = self.collect_where(|_| true).await;
        sort_newest_first(&mut todos);
        Ok(todos)
    }

    async fn find_all_active(&self) -> Result<Vec<Todo>, StoreError> {
        let mut todos = self.collect_where(|todo| !todo.is_deleted()).await;
        sort_newest_first(&mut todos);
        Ok(todos)
    }

    async fn find_all_deleted(&self) -> Result<Vec<Todo>, StoreError> {
        let mut todos = self.collect_where(Todo::is_deleted).await;
        todos.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(todos)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.read().await.get(id).cloned())
    }

    async fn find_by_description(&self, description: &str) -> Result<Option<Todo>, StoreError> {
        Ok(self
            .todos
            .read()
            .await
            .values()
            .find(|todo| todo.description == description)
            .cloned())
    }

    async fn create(&self, todo: Todo) -> Result<Outcome<Todo>, StoreError> {
        // Checks and insert happen under one write lock.
        let mut todos = self.todos.write().await;
        if todos.contains_key(&todo.id) {
            return Ok(Outcome::failure(ID_EXISTS));
        }
        if todos.values().any(|t| t.description == todo.description) {
            return Ok(Outcome::failure(DESCRIPTION_EXISTS));
        }
        todos.insert(todo.id.clone(), todo.clone());
        Ok(Outcome::Success(todo))
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> Result<Outcome<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        if !todos.contains_key(id) {
            return Ok(Outcome::failure(ID_MISSING));
        }
        if let Some(description) = &patch.description {
            let taken = todos
                .values()
                .any(|t| t.id != id && &t.description == description);
            if taken {
                return Ok(Outcome::failure(DESCRIPTION_EXISTS));
            }
        }
        let Some(todo) = todos.get_mut(id) else {
            return Ok(Outcome::failure(ID_MISSING));
        };
        patch.apply_to(todo);
        Ok(Outcome::Success(todo.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Outcome<Todo>, StoreError> {
        match self.todos.write().await.remove(id) {
            Some(todo) => Ok(Outcome::Success(todo)),
            None => Ok(Outcome::failure(ID_MISSING)),
        }
    }
}
