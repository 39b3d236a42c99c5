//! Todo list store.

use helm_core::events::{EventPayload, PushEvent};
use helm_core::types::{TodoCreate, TodoItem, TodoUpdate};
use tracing::warn;

use super::{Change, ListState};
use crate::api::ApiClient;
use crate::error::Result;

/// Todos: fetch-on-start plus event-driven patching.
pub struct TodoStore {
    api: ApiClient,
    state: ListState<TodoItem>,
}

impl TodoStore {
    /// Create a store backed by the given API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: ListState::new(),
        }
    }

    /// Current items.
    #[must_use]
    pub fn todos(&self) -> &[TodoItem] {
        self.state.items()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.state.loading
    }

    /// Most recent error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Replace the list with the backend's, optionally session-scoped.
    /// On failure the previous list stays intact and the error is
    /// recorded.
    pub async fn fetch(&mut self, session_id: Option<&str>) {
        self.state.begin_fetch();
        match self.api.list_todos(session_id).await {
            Ok(todos) => self.state.finish_fetch(todos),
            Err(error) => {
                warn!(%error, "failed to fetch todos");
                self.state.fail_fetch(&error);
            }
        }
    }

    /// Create a todo. The list is patched by the `todo_added` push
    /// event, not by this call.
    pub async fn add(&mut self, fields: TodoCreate) -> Result<TodoItem> {
        let result = self.api.create_todo(&fields).await;
        self.mutate(result)
    }

    /// Update a todo with only the changed fields; list membership again
    /// follows the push event.
    pub async fn update(&mut self, id: &str, fields: TodoUpdate) -> Result<TodoItem> {
        let result = self.api.update_todo(id, &fields).await;
        self.mutate(result)
    }

    /// Flip completion server-side via the dedicated toggle endpoint.
    pub async fn toggle(&mut self, id: &str) -> Result<TodoItem> {
        let result = self.api.toggle_todo(id).await;
        self.mutate(result)
    }

    /// Delete a todo; removal from the list follows the `todo_deleted`
    /// event.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let result = self.api.delete_todo(id).await;
        self.mutate(result)
    }

    /// Record the outcome of a mutating call without touching the list.
    fn mutate<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.state.error = None;
                Ok(value)
            }
            Err(error) => {
                warn!(%error, "todo mutation failed");
                self.state.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Apply a push event if it concerns todos.
    pub fn handle_event(&mut self, event: &PushEvent) {
        match event.typed_payload() {
            Some(EventPayload::TodoAdded(todo)) => self.state.apply(Change::Added(todo)),
            Some(EventPayload::TodoUpdated(todo)) => self.state.apply(Change::Updated(todo)),
            Some(EventPayload::TodoDeleted(id)) => self.state.apply(Change::Deleted(id)),
            Some(EventPayload::TodoList(todos)) => self.state.apply(Change::Snapshot(todos)),
            Some(EventPayload::Error(message)) => self.state.backend_error(message),
            _ => {}
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
