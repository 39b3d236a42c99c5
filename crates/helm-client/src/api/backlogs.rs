//! `/api/backlogs` endpoint wrappers.
//!
//! Includes the promotion endpoint: `send-to-todo` creates a todo from a
//! backlog item and deletes the backlog entry server-side; the paired
//! `todo_added` / `backlog_deleted` push events move it between lists.

use helm_core::types::{BacklogCreate, BacklogItem, BacklogUpdate, TodoItem};
use reqwest::Method;

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// `GET /api/backlogs`.
    pub async fn list_backlogs(&self) -> Result<Vec<BacklogItem>> {
        self.get_json("/api/backlogs", &[]).await
    }

    /// `POST /api/backlogs`.
    pub async fn create_backlog(&self, fields: &BacklogCreate) -> Result<BacklogItem> {
        self.send_json(Method::POST, "/api/backlogs", fields).await
    }

    /// `PUT /api/backlogs/{id}` with only the changed fields.
    pub async fn update_backlog(&self, id: &str, fields: &BacklogUpdate) -> Result<BacklogItem> {
        self.send_json(Method::PUT, &format!("/api/backlogs/{id}"), fields)
            .await
    }

    /// `POST /api/backlogs/{id}/send-to-todo`: promote to a todo.
    pub async fn send_backlog_to_todo(&self, id: &str) -> Result<TodoItem> {
        self.send_empty(Method::POST, &format!("/api/backlogs/{id}/send-to-todo"))
            .await
    }

    /// `DELETE /api/backlogs/{id}`.
    pub async fn delete_backlog(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/backlogs/{id}")).await
    }
}
