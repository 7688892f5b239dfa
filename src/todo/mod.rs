//! Todo domain: the task record, partial updates, and the uniform operation result.
//!
//! - `validate`: description length rules
//! - `factory`: builds validated tasks and update patches from raw input
//! - `usecases`: create/update/delete orchestration over a [`TodoStore`]
//! - `actions`: use cases plus change notifications for subscribers
//!
//! [`TodoStore`]: crate::api::todo_store::TodoStore

pub mod actions;
pub mod factory;
pub mod usecases;
pub mod validate;

pub use actions::{ChangeEvent, ChangeKind, TodoActions};
pub use factory::{make_new_todo, make_new_validated_todo, make_update_validated_todo};
pub use usecases::{TodoFilter, TodoService};
pub use validate::{validate_description, DescriptionCheck};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const ID_EXISTS: &str = "Todo with this ID already exists";
pub const DESCRIPTION_EXISTS: &str = "Todo with this description already exists";
pub const ID_MISSING: &str = "Todo with this ID does not exist";
pub const INVALID_ID: &str = "Invalid ID";

/// A todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    /// Sanitized text, unique across all rows
    pub description: String,
    /// RFC3339 creation time, never changes after insert
    pub created_at: String,
    /// Set when the task was soft-deleted
    #[serde(default)]
    pub deleted_at: Option<String>,
}

impl Todo {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Partial todo used by the update path.
///
/// `id` and `created_at` are accepted on input so callers can send a whole
/// record back, but they are stripped before reaching storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// `Some(None)` clears the soft-delete mark, `None` leaves it alone.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub deleted_at: Option<Option<String>>,
}

impl TodoPatch {
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn deleted_at(deleted_at: Option<String>) -> Self {
        Self {
            deleted_at: Some(deleted_at),
            ..Self::default()
        }
    }

    /// True when the patch changes no mutable field.
    pub fn is_noop(&self) -> bool {
        self.description.is_none() && self.deleted_at.is_none()
    }

    /// Apply the mutable fields to `todo`. `id` and `created_at` are ignored.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(description) = &self.description {
            todo.description = description.clone();
        }
        if let Some(deleted_at) = &self.deleted_at {
            todo.deleted_at = deleted_at.clone();
        }
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Result of every todo operation.
///
/// Business-rule failures (validation, duplicates, missing rows) are carried
/// here as messages; infrastructure faults travel as `Err` beside it.
/// Serializes as `{"success": true, "todo": ..}` or
/// `{"success": false, "errors": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Failure(Vec<String>),
}

impl<T> Outcome<T> {
    /// Failure with a single message.
    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure(vec![message.into()])
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Outcome::Success(_) => &[],
            Outcome::Failure(errors) => errors,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(errors) => Outcome::Failure(errors),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcome", 2)?;
        match self {
            Outcome::Success(todo) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("todo", todo)?;
            }
            Outcome::Failure(errors) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("errors", errors)?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Todo {
        Todo {
            id: "t-1".to_string(),
            description: "Buy groceries".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            deleted_at: None,
        }
    }

    #[test]
    fn todo_serializes_with_camel_case_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "t-1",
                "description": "Buy groceries",
                "createdAt": "2026-01-01T00:00:00.000Z",
                "deletedAt": null,
            })
        );
    }

    #[test]
    fn outcome_serializes_as_tagged_shape() {
        let ok = serde_json::to_value(Outcome::Success(sample())).unwrap();
        assert_eq!(ok["success"], json!(true));
        assert_eq!(ok["todo"]["id"], json!("t-1"));
        assert!(ok.get("errors").is_none());

        let failed = serde_json::to_value(Outcome::<Todo>::failure(ID_MISSING)).unwrap();
        assert_eq!(
            failed,
            json!({ "success": false, "errors": ["Todo with this ID does not exist"] })
        );
    }

    #[test]
    fn patch_distinguishes_absent_and_null_deleted_at() {
        let absent: TodoPatch = serde_json::from_value(json!({ "description": "x" })).unwrap();
        assert_eq!(absent.deleted_at, None);

        let cleared: TodoPatch = serde_json::from_value(json!({ "deletedAt": null })).unwrap();
        assert_eq!(cleared.deleted_at, Some(None));

        let set: TodoPatch =
            serde_json::from_value(json!({ "deletedAt": "2026-02-02T00:00:00.000Z" })).unwrap();
        assert_eq!(
            set.deleted_at,
            Some(Some("2026-02-02T00:00:00.000Z".to_string()))
        );
    }

    #[test]
    fn patch_apply_ignores_immutable_fields() {
        let mut todo = sample();
        let patch = TodoPatch {
            id: Some("other".to_string()),
            description: Some("Walk the dog".to_string()),
            created_at: Some("1999-01-01T00:00:00.000Z".to_string()),
            deleted_at: Some(Some("2026-03-03T00:00:00.000Z".to_string())),
        };
        patch.apply_to(&mut todo);
        assert_eq!(todo.id, "t-1");
        assert_eq!(todo.created_at, "2026-01-01T00:00:00.000Z");
        assert_eq!(todo.description, "Walk the dog");
        assert!(todo.is_deleted());
    }

    #[test]
    fn outcome_map_keeps_errors() {
        let failed: Outcome<i32> = Outcome::Failure(vec!["a".into(), "b".into()]);
        let mapped = failed.map(|n| n + 1);
        assert_eq!(mapped.errors(), ["a".to_string(), "b".to_string()]);
        assert_eq!(Outcome::Success(1).map(|n| n + 1), Outcome::Success(2));
    }
}
