//! Builds well-formed tasks and update patches from raw input.

use uuid::Uuid;

use super::validate::validate_description;
use super::{Outcome, Todo, TodoPatch};
use crate::util::{now_string, sanitize_str};

/// Fresh task with a random id, stamped with the current time.
pub fn make_new_todo(description: String) -> Todo {
    Todo {
        id: Uuid::new_v4().to_string(),
        description,
        created_at: now_string(),
        deleted_at: None,
    }
}

/// Sanitize and validate `raw`, then build a new task from the sanitized text.
///
/// Validation errors are returned unchanged.
pub fn make_new_validated_todo(raw: &str) -> Outcome<Todo> {
    let description = sanitize_str(raw);
    let check = validate_description(&description);
    if !check.success {
        return Outcome::Failure(check.errors);
    }
    Outcome::Success(make_new_todo(description))
}

/// Validate an update patch.
///
/// A present description is sanitized and validated, and replaced by its
/// sanitized form. `id` and `created_at` are always dropped. Other fields
/// pass through.
pub fn make_update_validated_todo(mut patch: TodoPatch) -> Outcome<TodoPatch> {
    if let Some(raw) = patch.description.take() {
        let description = sanitize_str(&raw);
        let check = validate_description(&description);
        if !check.success {
            return Outcome::Failure(check.errors);
        }
        patch.description = Some(description);
    }
    patch.id = None;
    patch.created_at = None;
    Outcome::Success(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::validate::{TOO_LONG, TOO_SHORT};

    #[test]
    fn new_todo_has_id_and_timestamp() {
        let todo = make_new_todo("Buy groceries".to_string());
        assert_eq!(todo.description, "Buy groceries");
        assert!(Uuid::parse_str(&todo.id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&todo.created_at).is_ok());
        assert_eq!(todo.deleted_at, None);
    }

    #[test]
    fn new_todos_get_distinct_ids() {
        let a = make_new_todo("first".to_string());
        let b = make_new_todo("first".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn validated_todo_uses_sanitized_description() {
        let outcome = make_new_validated_todo("   Cafe\u{301} run  ");
        let todo = outcome.into_value().expect("valid description");
        assert_eq!(todo.description, "Caf\u{e9} run");
    }

    #[test]
    fn validated_todo_rejects_short_after_trim() {
        let outcome = make_new_validated_todo("   ab   ");
        assert_eq!(outcome, Outcome::Failure(vec![TOO_SHORT.to_string()]));
    }

    #[test]
    fn validated_todo_rejects_long() {
        let outcome = make_new_validated_todo(&"a".repeat(300));
        assert_eq!(outcome.errors(), [TOO_LONG.to_string()]);
    }

    #[test]
    fn update_strips_immutable_fields() {
        let patch = TodoPatch {
            id: Some("t-1".to_string()),
            description: Some("  Walk the dog ".to_string()),
            created_at: Some("2026-01-01T00:00:00.000Z".to_string()),
            deleted_at: Some(Some("2026-01-02T00:00:00.000Z".to_string())),
        };
        let outcome = make_update_validated_todo(patch);
        assert_eq!(
            outcome,
            Outcome::Success(TodoPatch {
                id: None,
                description: Some("Walk the dog".to_string()),
                created_at: None,
                deleted_at: Some(Some("2026-01-02T00:00:00.000Z".to_string())),
            })
        );
    }

    #[test]
    fn update_without_description_skips_validation() {
        let patch = TodoPatch {
            id: Some("t-1".to_string()),
            ..TodoPatch::default()
        };
        let outcome = make_update_validated_todo(patch);
        assert_eq!(outcome, Outcome::Success(TodoPatch::default()));
    }

    #[test]
    fn update_with_invalid_description_fails() {
        let outcome = make_update_validated_todo(TodoPatch::description(""));
        assert_eq!(outcome, Outcome::Failure(vec![TOO_SHORT.to_string()]));
    }
}
