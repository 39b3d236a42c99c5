//! `/api/approvals` endpoint wrappers.

use helm_core::types::Approval;
use reqwest::Method;

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// `GET /api/approvals`.
    pub async fn list_approvals(&self) -> Result<Vec<Approval>> {
        self.get_json("/api/approvals", &[]).await
    }

    /// `POST /api/approvals/{id}/approve`.
    pub async fn approve_approval(&self, id: &str) -> Result<Approval> {
        self.send_empty(Method::POST, &format!("/api/approvals/{id}/approve"))
            .await
    }

    /// `POST /api/approvals/{id}/reject`.
    pub async fn reject_approval(&self, id: &str) -> Result<Approval> {
        self.send_empty(Method::POST, &format!("/api/approvals/{id}/reject"))
            .await
    }

    /// `DELETE /api/approvals/{id}`.
    pub async fn delete_approval(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/approvals/{id}")).await
    }
}
