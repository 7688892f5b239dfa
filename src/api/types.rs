//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::todo::TodoFilter;
use crate::util::sanitize_opt;

/// Request to create a todo.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoRequest {
    /// Raw text; sanitized and validated server-side. A missing field is
    /// treated as empty and fails validation.
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateTodoRequest {
    /// Sanitized description, empty when absent.
    pub fn description(&self) -> String {
        sanitize_opt(self.description.as_deref())
    }
}

/// Query string for listing todos.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTodosQuery {
    #[serde(default)]
    pub filter: TodoFilter,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Active environment name
    pub env: String,
    /// Whether todos survive a restart
    pub persistent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_tolerates_missing_description() {
        let req: CreateTodoRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.description(), "");
        let req: CreateTodoRequest =
            serde_json::from_str(r#"{"description":"  Buy milk "}"#).unwrap();
        assert_eq!(req.description(), "Buy milk");
        let req: CreateTodoRequest = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(req.description(), "");
    }

    #[test]
    fn test_list_query_defaults_to_all() {
        let query: ListTodosQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.filter, TodoFilter::All);
        let query: ListTodosQuery = serde_json::from_str(r#"{"filter":"active"}"#).unwrap();
        assert_eq!(query.filter, TodoFilter::Active);
    }
}
