//! The [`PushEvent`] envelope: server-to-console push notifications.
//!
//! Events arrive over the `/events` SSE stream as a flat JSON envelope
//! with the event name at the top level and an opaque `data` payload.
//! The canonical wire shape is `{"event": ..., "data": ...}`; older
//! emitters used `{"type": ..., "data": ...}` and that spelling is still
//! accepted on ingest (a serde alias), but never produced.
//!
//! Typed access to the payload is opt-in via [`PushEvent::typed_payload`],
//! which dispatches on the event name and deserializes the relevant
//! `data` key into the matching record. Unknown event names and
//! malformed payloads yield `None`; subscribers log and drop, they
//! never crash.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::text::preview;
use crate::types::{Approval, BacklogItem, CodeInterpreterState, PlanItem, TodoItem};

/// Event-name strings, grouped per resource.
pub mod names {
    /// `todo_added`
    pub const TODO_ADDED: &str = "todo_added";
    /// `todo_updated`
    pub const TODO_UPDATED: &str = "todo_updated";
    /// `todo_deleted`
    pub const TODO_DELETED: &str = "todo_deleted";
    /// `todo_list`
    pub const TODO_LIST: &str = "todo_list";
    /// `plan_added`
    pub const PLAN_ADDED: &str = "plan_added";
    /// `plan_updated`
    pub const PLAN_UPDATED: &str = "plan_updated";
    /// `plan_deleted`
    pub const PLAN_DELETED: &str = "plan_deleted";
    /// `plan_list`
    pub const PLAN_LIST: &str = "plan_list";
    /// `backlog_added`
    pub const BACKLOG_ADDED: &str = "backlog_added";
    /// `backlog_updated`
    pub const BACKLOG_UPDATED: &str = "backlog_updated";
    /// `backlog_deleted`
    pub const BACKLOG_DELETED: &str = "backlog_deleted";
    /// `backlog_list`
    pub const BACKLOG_LIST: &str = "backlog_list";
    /// `approval_added`
    pub const APPROVAL_ADDED: &str = "approval_added";
    /// `approval_updated`
    pub const APPROVAL_UPDATED: &str = "approval_updated";
    /// `approval_deleted`
    pub const APPROVAL_DELETED: &str = "approval_deleted";
    /// `approval_list`
    pub const APPROVAL_LIST: &str = "approval_list";
    /// `code_interpreter_state_created`
    pub const CODE_INTERPRETER_CREATED: &str = "code_interpreter_state_created";
    /// `code_interpreter_state_updated`
    pub const CODE_INTERPRETER_UPDATED: &str = "code_interpreter_state_updated";
    /// `code_interpreter_state_retrieved`
    pub const CODE_INTERPRETER_RETRIEVED: &str = "code_interpreter_state_retrieved";
    /// `file_created`
    pub const FILE_CREATED: &str = "file_created";
    /// `file_deleted`
    pub const FILE_DELETED: &str = "file_deleted";
    /// `file_list`
    pub const FILE_LIST: &str = "file_list";
    /// `error`
    pub const ERROR: &str = "error";
}

/// A push notification from the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Event name, e.g. `todo_added`.
    #[serde(alias = "type")]
    pub event: String,
    /// Event-specific payload (opaque JSON).
    #[serde(default)]
    pub data: Value,
}

impl PushEvent {
    /// Build an event from a name and payload.
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Parse an envelope from raw JSON text.
    ///
    /// Accepts both the canonical `{"event", "data"}` shape and the
    /// legacy `{"type", "data"}` shape. Returns `None` (with a warning)
    /// when the text is not valid JSON or carries no event name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(raw) {
            Ok(event) if !event.event.is_empty() => Some(event),
            Ok(_) => {
                warn!(payload = %preview(raw, 120), "push event without an event name");
                None
            }
            Err(error) => {
                warn!(%error, payload = %preview(raw, 120), "unparseable push event");
                None
            }
        }
    }

    /// Typed view of the payload, dispatched on the event name.
    ///
    /// Returns `None` for unknown event names and for payloads that do
    /// not deserialize into the expected record (logged, not fatal).
    #[must_use]
    pub fn typed_payload(&self) -> Option<EventPayload> {
        let payload = match self.event.as_str() {
            names::TODO_ADDED => EventPayload::TodoAdded(self.field("todo")?),
            names::TODO_UPDATED => EventPayload::TodoUpdated(self.field("todo")?),
            names::TODO_DELETED => EventPayload::TodoDeleted(self.field("todoId")?),
            names::TODO_LIST => EventPayload::TodoList(self.field("todos")?),
            names::PLAN_ADDED => EventPayload::PlanAdded(self.field("plan")?),
            names::PLAN_UPDATED => EventPayload::PlanUpdated(self.field("plan")?),
            names::PLAN_DELETED => EventPayload::PlanDeleted(self.field("planId")?),
            names::PLAN_LIST => EventPayload::PlanList(self.field("plans")?),
            names::BACKLOG_ADDED => EventPayload::BacklogAdded(self.field("backlog")?),
            names::BACKLOG_UPDATED => EventPayload::BacklogUpdated(self.field("backlog")?),
            names::BACKLOG_DELETED => EventPayload::BacklogDeleted(self.field("backlogId")?),
            names::BACKLOG_LIST => EventPayload::BacklogList(self.field("backlogs")?),
            names::APPROVAL_ADDED => EventPayload::ApprovalAdded(self.field("approval")?),
            names::APPROVAL_UPDATED => EventPayload::ApprovalUpdated(self.field("approval")?),
            names::APPROVAL_DELETED => EventPayload::ApprovalDeleted(self.field("approvalId")?),
            names::APPROVAL_LIST => EventPayload::ApprovalList(self.field("approvals")?),
            names::CODE_INTERPRETER_CREATED => {
                EventPayload::CodeInterpreterCreated(self.field("state")?)
            }
            names::CODE_INTERPRETER_UPDATED => {
                EventPayload::CodeInterpreterUpdated(self.field("state")?)
            }
            names::CODE_INTERPRETER_RETRIEVED => {
                EventPayload::CodeInterpreterRetrieved(self.field("state")?)
            }
            names::FILE_CREATED | names::FILE_DELETED | names::FILE_LIST => {
                EventPayload::FilesChanged
            }
            names::ERROR => EventPayload::Error(
                self.field("message")
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
            _ => return None,
        };
        Some(payload)
    }

    /// Deserialize one key out of the payload, warning on mismatch.
    fn field<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.data.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                warn!(
                    event = %self.event,
                    key,
                    %error,
                    "push event payload did not match the expected shape"
                );
                None
            }
        }
    }
}

/// Typed payload of a [`PushEvent`].
#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
    /// A todo was created.
    TodoAdded(TodoItem),
    /// A todo changed.
    TodoUpdated(TodoItem),
    /// A todo was removed; carries the id.
    TodoDeleted(String),
    /// Bulk todo snapshot.
    TodoList(Vec<TodoItem>),
    /// A plan item was created.
    PlanAdded(PlanItem),
    /// A plan item changed.
    PlanUpdated(PlanItem),
    /// A plan item was removed; carries the id.
    PlanDeleted(String),
    /// Bulk plan snapshot.
    PlanList(Vec<PlanItem>),
    /// A backlog item was created.
    BacklogAdded(BacklogItem),
    /// A backlog item changed.
    BacklogUpdated(BacklogItem),
    /// A backlog item was removed; carries the id.
    BacklogDeleted(String),
    /// Bulk backlog snapshot.
    BacklogList(Vec<BacklogItem>),
    /// An approval was requested.
    ApprovalAdded(Approval),
    /// An approval changed (usually a decision landing).
    ApprovalUpdated(Approval),
    /// An approval was removed; carries the id.
    ApprovalDeleted(String),
    /// Bulk approval snapshot.
    ApprovalList(Vec<Approval>),
    /// A code-interpreter run was created.
    CodeInterpreterCreated(CodeInterpreterState),
    /// A code-interpreter run changed.
    CodeInterpreterUpdated(CodeInterpreterState),
    /// A code-interpreter run was fetched server-side; upsert.
    CodeInterpreterRetrieved(CodeInterpreterState),
    /// The file listing changed in some way; refetch.
    FilesChanged,
    /// Backend-reported error; carries the message.
    Error(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
