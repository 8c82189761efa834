//! DTOs for the todo API.
//!
//! # Design
//! `Todo` is the persisted record; `CreateTodo` and `UpdateTodo` are
//! transient request shapes. `UpdateTodo` carries partial-update
//! semantics — only fields present in the JSON are applied — and is
//! echoed back as the update response body, so `None` fields are
//! skipped when serializing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item as stored and returned by the API.
///
/// `id` is assigned by the store and never reused; `created_at` is set
/// once at creation and never modified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a new todo. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub name: String,
    pub description: String,
    pub completed: bool,
}

/// Request payload for updating an existing todo. Only the fields
/// present in the JSON are applied; omitted fields remain unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// True when the request carries no fields to apply.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_created_at_as_rfc3339() {
        let todo = Todo {
            id: 1,
            name: "Test".to_string(),
            description: "desc".to_string(),
            completed: false,
            created_at: "2024-01-02T03:04:05Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Test");
        assert_eq!(json["created_at"], "2024-01-02T03:04:05Z");
    }

    #[test]
    fn create_todo_requires_all_fields() {
        let result: Result<CreateTodo, _> =
            serde_json::from_str(r#"{"name":"Buy milk","description":"2%"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn create_todo_accepts_full_payload() {
        let input: CreateTodo =
            serde_json::from_str(r#"{"name":"Buy milk","description":"2%","completed":false}"#)
                .unwrap();
        assert_eq!(input.name, "Buy milk");
        assert_eq!(input.description, "2%");
        assert!(!input.completed);
    }

    #[test]
    fn update_todo_all_fields_optional() {
        let input: UpdateTodo = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.is_empty());
    }

    #[test]
    fn update_todo_skips_absent_fields_when_echoed() {
        let input: UpdateTodo = serde_json::from_str(r#"{"name":"New name"}"#).unwrap();
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["name"], "New name");
        assert!(json.get("description").is_none());
        assert!(json.get("completed").is_none());
    }
}
