//! Domain types and wire DTOs for the todo API.
//!
//! # Design
//! Request bodies keep every field optional so a missing or malformed field
//! surfaces as a validation error (400) instead of a deserialization
//! failure. `Priority` travels as a lowercase string on the wire and is
//! parsed into the enum once at the handler edge; the store only ever sees
//! the enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parse the wire string. Only the three canonical values match;
    /// callers decide whether a non-match is an error (request bodies) or
    /// "no filter" (list queries).
    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Sort weight for list ordering: high 3, medium 2, low 1.
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// A single task record.
///
/// `id` is unique and monotonic for the process lifetime. `created_at` is
/// set once; `updated_at` is refreshed on every successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a todo.
///
/// `text` is optional at the wire level so a missing field reports as
/// invalid input rather than a 422 from the JSON extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodo {
    pub text: Option<String>,
    pub priority: Option<String>,
}

/// Request body for updating a todo. Omitted fields leave the record
/// unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

/// Validated patch applied by the store. Each field is independently
/// present or absent; absent means "keep the current value."
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

/// Query parameters for `GET /api/todos`.
///
/// Raw strings, converted by `into_filter`. `completed` follows the
/// source-of-truth comparison `value == "true"`; `priority` matches only
/// the three enum strings and anything else (including "all") bypasses
/// the filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub completed: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn into_filter(self) -> ListFilter {
        ListFilter {
            completed: self.completed.map(|s| s == "true"),
            priority: self.priority.as_deref().and_then(Priority::parse),
            search: self.search,
        }
    }
}

/// Query parameters for `DELETE /api/todos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkDeleteQuery {
    pub completed: Option<String>,
}

/// Resolved list filter consumed by the store. Filters apply
/// conjunctively: completed-state, then priority, then search.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

/// Aggregate statistics over the collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    /// Integer percentage, rounded to nearest; 0 for an empty collection.
    pub completion_rate: u32,
    pub by_priority: PriorityCounts,
}

/// Per-priority record counts; every key present, 0 when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Envelope for `GET /api/todos`: the filtered page plus the unfiltered
/// collection size.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<Task>,
    pub count: usize,
    pub total: usize,
}

/// Envelope for single-record responses. `message` appears on mutations
/// and is omitted on plain reads.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub success: bool,
    pub data: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Envelope for `DELETE /api/todos`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: usize,
}

/// Envelope for `GET /api/todos/stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: Stats,
}
