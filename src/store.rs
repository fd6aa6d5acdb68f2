//! The task store: the authoritative collection plus the id counter.
//!
//! # Design
//! The store is plain synchronous data — no locking, no I/O. Handlers
//! reach it through a single `Arc<RwLock<_>>` boundary; tests construct a
//! fresh store directly. Mutations validate before touching state, so a
//! failed call leaves the collection exactly as it was.
//!
//! Ids post-increment from 1 and are never reused after deletion. The
//! counter resets only when the whole collection is cleared by an
//! unfiltered bulk delete; a filtered bulk delete leaves it alone.

use chrono::Utc;

use crate::error::ApiError;
use crate::types::{ListFilter, Priority, PriorityCounts, Stats, Task, TodoPatch};

/// Maximum length of a task's text after trimming.
pub const MAX_TEXT_LEN: usize = 100;

/// Trim and bounds-check task text. Empty-after-trim is checked before
/// length, matching the create/update validation order.
pub fn validate_text(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(
            "Todo text cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::InvalidInput(format!(
            "Todo text cannot exceed {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// In-memory task collection plus the monotonic id counter.
#[derive(Debug)]
pub struct TodoStore {
    todos: Vec<Task>,
    next_id: u64,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            next_id: 1,
        }
    }

    /// Filter and sort the collection. Filters apply conjunctively in
    /// order: completed-state, priority, case-insensitive text search.
    /// The result is sorted by priority weight descending, then
    /// `created_at` descending. Also returns the unfiltered total.
    pub fn list(&self, filter: &ListFilter) -> (Vec<Task>, usize) {
        let total = self.todos.len();
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let mut tasks: Vec<Task> = self
            .todos
            .iter()
            .filter(|t| filter.completed.map_or(true, |c| t.completed == c))
            .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
            .filter(|t| {
                needle
                    .as_ref()
                    .map_or(true, |n| t.text.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        tasks.sort_by(|a, b| {
            b.priority
                .weight()
                .cmp(&a.priority.weight())
                .then(b.created_at.cmp(&a.created_at))
        });
        (tasks, total)
    }

    pub fn get(&self, id: u64) -> Result<Task, ApiError> {
        self.todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.todos.iter().any(|t| t.id == id)
    }

    /// Append a new task. `text` must already be validated; the id comes
    /// from the counter, `completed` starts false, and both timestamps
    /// are stamped with the same instant.
    pub fn create(&mut self, text: String, priority: Priority) -> Task {
        let now = Utc::now();
        let task = Task {
            id: self.next_id,
            text,
            completed: false,
            priority,
            created_at: now,
            updated_at: now,
        };
        self.next_id += 1;
        self.todos.push(task.clone());
        task
    }

    /// Merge a validated patch into the record. Absent fields keep their
    /// current values; `updated_at` is refreshed on success.
    pub fn update(&mut self, id: u64, patch: TodoPatch) -> Result<Task, ApiError> {
        let todo = self
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ApiError::NotFound)?;
        if let Some(text) = patch.text {
            todo.text = text;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        if let Some(priority) = patch.priority {
            todo.priority = priority;
        }
        todo.updated_at = Utc::now();
        Ok(todo.clone())
    }

    /// Remove one task and return its full record.
    pub fn delete(&mut self, id: u64) -> Result<Task, ApiError> {
        let idx = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(ApiError::NotFound)?;
        Ok(self.todos.remove(idx))
    }

    /// Bulk removal, returning the number of records removed. With a
    /// completed-state filter only matching records go and the counter is
    /// untouched; without one the collection is cleared and the counter
    /// restarts at 1.
    pub fn delete_all(&mut self, completed: Option<bool>) -> usize {
        match completed {
            Some(state) => {
                let before = self.todos.len();
                self.todos.retain(|t| t.completed != state);
                before - self.todos.len()
            }
            None => {
                let removed = self.todos.len();
                self.todos.clear();
                self.next_id = 1;
                removed
            }
        }
    }

    pub fn stats(&self) -> Stats {
        let total = self.todos.len();
        let completed = self.todos.iter().filter(|t| t.completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };
        let count_of = |p: Priority| self.todos.iter().filter(|t| t.priority == p).count();
        Stats {
            total,
            completed,
            active: total - completed,
            completion_rate,
            by_priority: PriorityCounts {
                low: count_of(Priority::Low),
                medium: count_of(Priority::Medium),
                high: count_of(Priority::High),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store_with(tasks: Vec<Task>) -> TodoStore {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        TodoStore {
            todos: tasks,
            next_id,
        }
    }

    fn task(id: u64, text: &str, completed: bool, priority: Priority, secs: u32) -> Task {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, secs).unwrap();
        Task {
            id,
            text: text.to_string(),
            completed,
            priority,
            created_at: at,
            updated_at: at,
        }
    }

    // --- validate_text ---

    #[test]
    fn validate_text_trims_whitespace() {
        assert_eq!(validate_text("  Buy milk  ").unwrap(), "Buy milk");
    }

    #[test]
    fn validate_text_rejects_empty() {
        assert!(matches!(
            validate_text(""),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_text("   "),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_text_boundary_at_100_chars() {
        assert!(validate_text(&"a".repeat(100)).is_ok());
        assert!(matches!(
            validate_text(&"a".repeat(101)),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_text_length_counted_after_trim() {
        let padded = format!("  {}  ", "a".repeat(100));
        assert!(validate_text(&padded).is_ok());
    }

    // --- create ---

    #[test]
    fn create_assigns_increasing_ids_from_1() {
        let mut store = TodoStore::new();
        let a = store.create("first".to_string(), Priority::Medium);
        let b = store.create("second".to_string(), Priority::Medium);
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn create_defaults() {
        let mut store = TodoStore::new();
        let task = store.create("task".to_string(), Priority::default());
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn create_then_get_round_trips() {
        let mut store = TodoStore::new();
        let created = store.create("X".to_string(), Priority::High);
        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched.text, "X");
        assert_eq!(fetched, created);
    }

    // --- get / delete ---

    #[test]
    fn get_missing_id_is_not_found() {
        let store = TodoStore::new();
        assert_eq!(store.get(42), Err(ApiError::NotFound));
    }

    #[test]
    fn delete_returns_removed_record() {
        let mut store = TodoStore::new();
        let created = store.create("doomed".to_string(), Priority::Low);
        let removed = store.delete(created.id).unwrap();
        assert_eq!(removed, created);
        assert_eq!(store.get(created.id), Err(ApiError::NotFound));
    }

    #[test]
    fn delete_missing_id_is_not_found() {
        let mut store = TodoStore::new();
        assert_eq!(store.delete(7), Err(ApiError::NotFound));
    }

    #[test]
    fn deleted_ids_are_never_reused() {
        let mut store = TodoStore::new();
        let a = store.create("a".to_string(), Priority::Medium);
        store.delete(a.id).unwrap();
        let b = store.create("b".to_string(), Priority::Medium);
        assert_eq!(b.id, a.id + 1);
    }

    // --- update ---

    #[test]
    fn update_merges_only_present_fields() {
        let mut store = TodoStore::new();
        let created = store.create("keep me".to_string(), Priority::High);
        let updated = store
            .update(
                created.id,
                TodoPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.text, "keep me");
        assert_eq!(updated.priority, Priority::High);
        assert!(updated.completed);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let mut store = TodoStore::new();
        assert_eq!(
            store.update(1, TodoPatch::default()),
            Err(ApiError::NotFound)
        );
    }

    #[test]
    fn update_can_replace_every_field() {
        let mut store = TodoStore::new();
        let created = store.create("old".to_string(), Priority::Low);
        let updated = store
            .update(
                created.id,
                TodoPatch {
                    text: Some("new".to_string()),
                    completed: Some(true),
                    priority: Some(Priority::High),
                },
            )
            .unwrap();
        assert_eq!(updated.text, "new");
        assert!(updated.completed);
        assert_eq!(updated.priority, Priority::High);
    }

    // --- delete_all ---

    #[test]
    fn unfiltered_delete_all_clears_and_resets_counter() {
        let mut store = TodoStore::new();
        store.create("a".to_string(), Priority::Medium);
        store.create("b".to_string(), Priority::Medium);
        let removed = store.delete_all(None);
        assert_eq!(removed, 2);
        assert_eq!(store.stats().total, 0);
        let next = store.create("fresh".to_string(), Priority::Medium);
        assert_eq!(next.id, 1);
    }

    #[test]
    fn filtered_delete_all_keeps_counter() {
        let mut store = TodoStore::new();
        let a = store.create("done".to_string(), Priority::Medium);
        store.create("pending".to_string(), Priority::Medium);
        store
            .update(
                a.id,
                TodoPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        let removed = store.delete_all(Some(true));
        assert_eq!(removed, 1);
        assert_eq!(store.stats().total, 1);
        let next = store.create("third".to_string(), Priority::Medium);
        assert_eq!(next.id, 3);
    }

    #[test]
    fn filtered_delete_all_false_removes_active_records() {
        let mut store = store_with(vec![
            task(1, "done", true, Priority::Medium, 0),
            task(2, "pending", false, Priority::Medium, 1),
            task(3, "also pending", false, Priority::Medium, 2),
        ]);
        let removed = store.delete_all(Some(false));
        assert_eq!(removed, 2);
        assert!(store.contains(1));
        assert!(!store.contains(2));
    }

    // --- list ---

    #[test]
    fn list_sorts_by_weight_then_created_at_descending() {
        let store = store_with(vec![
            task(1, "low early", false, Priority::Low, 0),
            task(2, "high early", false, Priority::High, 1),
            task(3, "high late", false, Priority::High, 2),
        ]);
        let (tasks, total) = store.list(&ListFilter::default());
        assert_eq!(total, 3);
        let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn list_filters_are_conjunctive() {
        let store = store_with(vec![
            task(1, "walk dog", false, Priority::High, 0),
            task(2, "walk cat", true, Priority::High, 1),
            task(3, "buy milk", false, Priority::High, 2),
            task(4, "walk fish", false, Priority::Low, 3),
        ]);
        let (tasks, total) = store.list(&ListFilter {
            completed: Some(false),
            priority: Some(Priority::High),
            search: Some("walk".to_string()),
        });
        assert_eq!(total, 4);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 1);
    }

    #[test]
    fn list_search_is_case_insensitive() {
        let store = store_with(vec![task(1, "Buy Milk", false, Priority::Medium, 0)]);
        let (tasks, _) = store.list(&ListFilter {
            search: Some("MILK".to_string()),
            ..Default::default()
        });
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn list_total_ignores_filters() {
        let store = store_with(vec![
            task(1, "a", true, Priority::Medium, 0),
            task(2, "b", false, Priority::Medium, 1),
        ]);
        let (tasks, total) = store.list(&ListFilter {
            completed: Some(true),
            ..Default::default()
        });
        assert_eq!(tasks.len(), 1);
        assert_eq!(total, 2);
    }

    // --- stats ---

    #[test]
    fn stats_on_empty_store_has_zero_rate() {
        let store = TodoStore::new();
        let stats = store.stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.by_priority.low, 0);
        assert_eq!(stats.by_priority.medium, 0);
        assert_eq!(stats.by_priority.high, 0);
    }

    #[test]
    fn stats_rounds_completion_rate_to_nearest() {
        let store = store_with(vec![
            task(1, "a", true, Priority::Low, 0),
            task(2, "b", true, Priority::Medium, 1),
            task(3, "c", false, Priority::High, 2),
        ]);
        let stats = store.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.active, 1);
        // 2/3 = 66.67% rounds to 67
        assert_eq!(stats.completion_rate, 67);
        assert_eq!(stats.by_priority.low, 1);
        assert_eq!(stats.by_priority.medium, 1);
        assert_eq!(stats.by_priority.high, 1);
    }
}
