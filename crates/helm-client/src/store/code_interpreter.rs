//! Code-interpreter state store.
//!
//! Tracks execution states pushed by the backend. The `retrieved` event
//! is an upsert: the backend emits it when a state is fetched on the
//! agent side, whether or not this console has seen it before.

use helm_core::events::{EventPayload, PushEvent};
use helm_core::types::{CodeInterpreterCreate, CodeInterpreterState, CodeInterpreterUpdate};
use tracing::warn;

use super::{Change, ListState};
use crate::api::ApiClient;
use crate::error::Result;

/// Code-interpreter runs: fetch-on-start plus event-driven patching.
pub struct CodeInterpreterStore {
    api: ApiClient,
    state: ListState<CodeInterpreterState>,
}

impl CodeInterpreterStore {
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
    pub fn states(&self) -> &[CodeInterpreterState] {
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
        match self.api.list_code_interpreter_states().await {
            Ok(items) => self.state.finish_fetch(items),
            Err(error) => {
                warn!(%error, "failed to fetch code-interpreter states");
                self.state.fail_fetch(&error);
            }
        }
    }

    /// Submit code for execution; insertion follows the `created` event.
    pub async fn create(&mut self, fields: CodeInterpreterCreate) -> Result<CodeInterpreterState> {
        let result = self.api.create_code_interpreter_state(&fields).await;
        self.mutate(result)
    }

    /// Update status/result; the list follows the `updated` event.
    pub async fn update(
        &mut self,
        id: &str,
        fields: CodeInterpreterUpdate,
    ) -> Result<CodeInterpreterState> {
        let result = self.api.update_code_interpreter_state(id, &fields).await;
        self.mutate(result)
    }

    /// Fetch one state directly (the backend also answers with a
    /// `retrieved` push event).
    pub async fn get(&mut self, id: &str) -> Result<CodeInterpreterState> {
        let result = self.api.get_code_interpreter_state(id).await;
        self.mutate(result)
    }

    fn mutate<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.state.error = None;
                Ok(value)
            }
            Err(error) => {
                warn!(%error, "code-interpreter mutation failed");
                self.state.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Apply a push event if it concerns code-interpreter states.
    pub fn handle_event(&mut self, event: &PushEvent) {
        match event.typed_payload() {
            Some(EventPayload::CodeInterpreterCreated(s)) => self.state.apply(Change::Added(s)),
            Some(EventPayload::CodeInterpreterUpdated(s)) => self.state.apply(Change::Updated(s)),
            Some(EventPayload::CodeInterpreterRetrieved(s)) => {
                self.state.apply(Change::Upserted(s));
            }
            Some(EventPayload::Error(message)) => self.state.backend_error(message),
            _ => {}
        }
    }
}
