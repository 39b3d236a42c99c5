//! Backlog store, including promotion to the todo list.

use helm_core::events::{EventPayload, PushEvent};
use helm_core::types::{BacklogCreate, BacklogItem, BacklogUpdate, TodoItem};
use tracing::warn;

use super::{Change, ListState};
use crate::api::ApiClient;
use crate::error::Result;

/// Backlog items: fetch-on-start plus event-driven patching.
pub struct BacklogStore {
    api: ApiClient,
    state: ListState<BacklogItem>,
}

impl BacklogStore {
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
    pub fn items(&self) -> &[BacklogItem] {
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

    /// Replace the list with the backend's.
    pub async fn fetch(&mut self) {
        self.state.begin_fetch();
        match self.api.list_backlogs().await {
            Ok(items) => self.state.finish_fetch(items),
            Err(error) => {
                warn!(%error, "failed to fetch backlog");
                self.state.fail_fetch(&error);
            }
        }
    }

    /// Create a backlog item; insertion follows the push event.
    pub async fn add(&mut self, fields: BacklogCreate) -> Result<BacklogItem> {
        let result = self.api.create_backlog(&fields).await;
        self.mutate(result)
    }

    /// Update a backlog item with only the changed fields.
    pub async fn update(&mut self, id: &str, fields: BacklogUpdate) -> Result<BacklogItem> {
        let result = self.api.update_backlog(id, &fields).await;
        self.mutate(result)
    }

    /// Promote a backlog item into a todo. The server creates the todo
    /// and deletes the backlog entry; the paired `todo_added` and
    /// `backlog_deleted` events move it between the two lists.
    pub async fn send_to_todo(&mut self, id: &str) -> Result<TodoItem> {
        let result = self.api.send_backlog_to_todo(id).await;
        self.mutate(result)
    }

    /// Delete a backlog item; removal follows the push event.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let result = self.api.delete_backlog(id).await;
        self.mutate(result)
    }

    fn mutate<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.state.error = None;
                Ok(value)
            }
            Err(error) => {
                warn!(%error, "backlog mutation failed");
                self.state.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Apply a push event if it concerns the backlog.
    pub fn handle_event(&mut self, event: &PushEvent) {
        match event.typed_payload() {
            Some(EventPayload::BacklogAdded(item)) => self.state.apply(Change::Added(item)),
            Some(EventPayload::BacklogUpdated(item)) => self.state.apply(Change::Updated(item)),
            Some(EventPayload::BacklogDeleted(id)) => self.state.apply(Change::Deleted(id)),
            Some(EventPayload::BacklogList(items)) => self.state.apply(Change::Snapshot(items)),
            Some(EventPayload::Error(message)) => self.state.backend_error(message),
            _ => {}
        }
    }
}
