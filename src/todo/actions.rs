//! Entry points used by the HTTP layer and the board.
//!
//! Every successful mutation is announced on a broadcast channel so open
//! views can refresh. Failed operations announce nothing.

use serde::Serialize;
use tokio::sync::broadcast;

use super::usecases::{TodoFilter, TodoService};
use super::{Outcome, Todo, TodoPatch};
use crate::api::todo_store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Trashed,
    Deleted,
    Restored,
}

/// Emitted after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub todo: Todo,
}

#[derive(Clone)]
pub struct TodoActions {
    service: TodoService,
    changes: broadcast::Sender<ChangeEvent>,
}

impl TodoActions {
    pub fn new(service: TodoService) -> Self {
        let (changes, _) = broadcast::channel(256);
        Self { service, changes }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    pub fn service(&self) -> &TodoService {
        &self.service
    }

    pub async fn list(&self, filter: TodoFilter) -> Result<Vec<Todo>, StoreError> {
        self.service.list_todos(filter).await
    }

    pub async fn create(&self, description: &str) -> Result<Outcome<Todo>, StoreError> {
        let outcome = self.service.create_todo(description).await?;
        Ok(self.announce(ChangeKind::Created, outcome))
    }

    pub async fn update(&self, id: &str, patch: TodoPatch) -> Result<Outcome<Todo>, StoreError> {
        let outcome = self.service.update_todo(id, patch).await?;
        Ok(self.announce(ChangeKind::Updated, outcome))
    }

    pub async fn trash(&self, id: &str) -> Result<Outcome<Todo>, StoreError> {
        let outcome = self.service.trash_todo(id).await?;
        Ok(self.announce(ChangeKind::Trashed, outcome))
    }

    pub async fn delete(&self, id: &str) -> Result<Outcome<Todo>, StoreError> {
        let outcome = self.service.delete_todo(id).await?;
        Ok(self.announce(ChangeKind::Deleted, outcome))
    }

    pub async fn restore(&self, todo: Todo) -> Result<Outcome<Todo>, StoreError> {
        let outcome = self.service.restore_todo(todo).await?;
        Ok(self.announce(ChangeKind::Restored, outcome))
    }

    fn announce(&self, kind: ChangeKind, outcome: Outcome<Todo>) -> Outcome<Todo> {
        if let Outcome::Success(todo) = &outcome {
            tracing::debug!(id = %todo.id, ?kind, "todo changed");
            // No subscribers is fine.
            let _ = self.changes.send(ChangeEvent {
                kind,
                todo: todo.clone(),
            });
        }
        outcome
    }
}
