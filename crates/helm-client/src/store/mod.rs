//! In-memory resource stores.
//!
//! Each store owns one list, seeded by a fetch and kept current by
//! applying push events. The event application policy is uniform across
//! resources:
//!
//! - `*_added` → append if the id is not already present
//! - `*_updated` → replace by id (absent ids are a no-op)
//! - `*_deleted` → filter out by id
//! - `*_list` → wholesale snapshot replace
//!
//! Mutating calls go out over HTTP but do **not** patch the list; the
//! corresponding push event does. A backend that fails to emit the event
//! leaves the list stale until the next `fetch`; that trade-off is
//! deliberate, and `fetch` is the explicit fallback.
//!
//! No store shares mutable state with another; the only cross-store
//! channel is the read-only event feed.

pub mod approvals;
pub mod backlogs;
pub mod code_interpreter;
pub mod files;
pub mod plans;
pub mod terminal;
pub mod todos;

pub use approvals::ApprovalStore;
pub use backlogs::BacklogStore;
pub use code_interpreter::CodeInterpreterStore;
pub use files::FileStore;
pub use plans::PlanStore;
pub use terminal::TerminalStore;
pub use todos::TodoStore;

use helm_core::types::{Approval, BacklogItem, CodeInterpreterState, PlanItem, TodoItem};

/// Records addressable by their server-issued id.
pub trait Identified {
    /// The record's id.
    fn id(&self) -> &str;
}

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

identified!(TodoItem, PlanItem, BacklogItem, Approval, CodeInterpreterState);

/// An incremental change to a list, derived from a push event.
#[derive(Clone, Debug)]
pub enum Change<T> {
    /// Insert if the id is not already present.
    Added(T),
    /// Replace the record with the same id.
    Updated(T),
    /// Remove the record with this id.
    Deleted(String),
    /// Replace if present, append otherwise.
    Upserted(T),
    /// Replace the entire list.
    Snapshot(Vec<T>),
}

/// List + loading/error state shared by every resource store.
#[derive(Clone, Debug)]
pub struct ListState<T> {
    items: Vec<T>,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Most recent failure, surfaced as a display string.
    pub error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

impl<T: Identified> ListState<T> {
    /// Empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current items, in list order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether an id is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    /// Apply one change under the uniform policy.
    pub fn apply(&mut self, change: Change<T>) {
        match change {
            Change::Added(item) => {
                if !self.contains(item.id()) {
                    self.items.push(item);
                }
            }
            Change::Updated(item) => {
                if let Some(slot) = self.items.iter_mut().find(|e| e.id() == item.id()) {
                    *slot = item;
                }
            }
            Change::Deleted(id) => {
                self.items.retain(|item| item.id() != id);
            }
            Change::Upserted(item) => {
                if let Some(slot) = self.items.iter_mut().find(|e| e.id() == item.id()) {
                    *slot = item;
                } else {
                    self.items.push(item);
                }
            }
            Change::Snapshot(items) => {
                self.items = items;
            }
        }
    }

    /// Record the start of a fetch.
    pub(crate) fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Record a successful fetch: the list becomes exactly the response.
    pub(crate) fn finish_fetch(&mut self, items: Vec<T>) {
        self.items = items;
        self.loading = false;
    }

    /// Record a failed fetch; the previous list stays intact.
    pub(crate) fn fail_fetch(&mut self, error: &impl std::fmt::Display) {
        self.error = Some(error.to_string());
        self.loading = false;
    }

    /// Record a backend-reported error event.
    pub(crate) fn backend_error(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn todo(id: &str, title: &str) -> TodoItem {
        TodoItem {
            id: id.into(),
            plan_id: None,
            title: title.into(),
            description: None,
            completed: false,
            session_id: None,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn added_appends_new_ids() {
        let mut state = ListState::new();
        state.apply(Change::Added(todo("t1", "a")));
        state.apply(Change::Added(todo("t2", "b")));
        assert_eq!(state.items().len(), 2);
        assert_eq!(state.items()[1].id, "t2");
    }

    #[test]
    fn added_twice_is_a_no_op() {
        let mut state = ListState::new();
        state.apply(Change::Added(todo("t1", "a")));
        state.apply(Change::Added(todo("t1", "a-again")));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].title, "a");
    }

    #[test]
    fn updated_replaces_by_id() {
        let mut state = ListState::new();
        state.apply(Change::Added(todo("t1", "old")));
        state.apply(Change::Updated(todo("t1", "new")));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].title, "new");
    }

    #[test]
    fn updated_unknown_id_is_a_no_op() {
        let mut state = ListState::new();
        state.apply(Change::Added(todo("t1", "a")));
        state.apply(Change::Updated(todo("t9", "ghost")));
        assert_eq!(state.items().len(), 1);
        assert!(!state.contains("t9"));
    }

    #[test]
    fn deleted_removes_exactly_one() {
        let mut state = ListState::new();
        state.apply(Change::Added(todo("t1", "a")));
        state.apply(Change::Added(todo("t2", "b")));
        state.apply(Change::Deleted("t1".into()));
        assert_eq!(state.items().len(), 1);
        assert!(!state.contains("t1"));
        assert!(state.contains("t2"));
    }

    #[test]
    fn snapshot_replaces_everything() {
        let mut state = ListState::new();
        state.apply(Change::Added(todo("t1", "a")));
        state.apply(Change::Snapshot(vec![todo("x", "x"), todo("y", "y")]));
        assert_eq!(state.items().len(), 2);
        assert!(!state.contains("t1"));
    }

    #[test]
    fn upserted_inserts_then_replaces() {
        let mut state = ListState::new();
        state.apply(Change::Upserted(todo("t1", "first")));
        assert_eq!(state.items().len(), 1);
        state.apply(Change::Upserted(todo("t1", "second")));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].title, "second");
    }

    #[test]
    fn failed_fetch_keeps_previous_items() {
        let mut state = ListState::new();
        state.finish_fetch(vec![todo("t1", "a")]);
        state.begin_fetch();
        state.fail_fetch(&"backend returned 500");
        assert_eq!(state.items().len(), 1);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("backend returned 500"));
    }

    #[test]
    fn begin_fetch_clears_stale_error() {
        let mut state: ListState<TodoItem> = ListState::new();
        state.backend_error("boom".into());
        state.begin_fetch();
        assert!(state.error.is_none());
        assert!(state.loading);
    }

    proptest! {
        /// Ids stay unique no matter what sequence of changes arrives.
        #[test]
        fn ids_always_unique(ops in proptest::collection::vec((0u8..4, 0u8..8), 0..64)) {
            let mut state = ListState::new();
            for (op, id) in ops {
                let id = format!("t{id}");
                match op {
                    0 => state.apply(Change::Added(todo(&id, "x"))),
                    1 => state.apply(Change::Updated(todo(&id, "y"))),
                    2 => state.apply(Change::Deleted(id)),
                    _ => state.apply(Change::Upserted(todo(&id, "z"))),
                }
            }
            let mut ids: Vec<&str> = state.items().iter().map(|t| t.id.as_str()).collect();
            ids.sort_unstable();
            let before = ids.len();
            ids.dedup();
            prop_assert_eq!(before, ids.len());
        }
    }
}
