//! Approval queue store.
//!
//! Decisions are guarded locally before any network call: an approval
//! already in a terminal status refuses approve/reject outright, so the
//! irreversibility invariant holds even against a confused backend or a
//! double-clicking operator.

use helm_core::events::{EventPayload, PushEvent};
use helm_core::types::{Approval, Decision};
use tracing::warn;

use super::{Change, Identified, ListState};
use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// Pending and decided approvals.
pub struct ApprovalStore {
    api: ApiClient,
    state: ListState<Approval>,
}

impl ApprovalStore {
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
    pub fn approvals(&self) -> &[Approval] {
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
        match self.api.list_approvals().await {
            Ok(items) => self.state.finish_fetch(items),
            Err(error) => {
                warn!(%error, "failed to fetch approvals");
                self.state.fail_fetch(&error);
            }
        }
    }

    /// Approve a pending request. The list update follows the
    /// `approval_updated` push event.
    pub async fn approve(&mut self, id: &str) -> Result<Approval> {
        self.guard(id, Decision::Approve)?;
        let result = self.api.approve_approval(id).await;
        self.mutate(result)
    }

    /// Reject a pending request.
    pub async fn reject(&mut self, id: &str) -> Result<Approval> {
        self.guard(id, Decision::Reject)?;
        let result = self.api.reject_approval(id).await;
        self.mutate(result)
    }

    /// Delete an approval record; removal follows the push event.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let result = self.api.delete_approval(id).await;
        self.mutate(result)
    }

    /// Run the decision against a local copy first, so a terminal
    /// approval refuses before any network call. Unknown ids pass
    /// through; the backend is authoritative for those.
    fn guard(&mut self, id: &str, decision: Decision) -> Result<()> {
        if let Some(approval) = self.state.items().iter().find(|a| a.id() == id) {
            let mut probe = approval.clone();
            if let Err(error) = probe.decide(decision) {
                self.state.error = Some(error.to_string());
                return Err(ClientError::Decided(error));
            }
        }
        Ok(())
    }

    fn mutate<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.state.error = None;
                Ok(value)
            }
            Err(error) => {
                warn!(%error, "approval mutation failed");
                self.state.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Apply a push event if it concerns approvals.
    pub fn handle_event(&mut self, event: &PushEvent) {
        match event.typed_payload() {
            Some(EventPayload::ApprovalAdded(item)) => self.state.apply(Change::Added(item)),
            Some(EventPayload::ApprovalUpdated(item)) => self.state.apply(Change::Updated(item)),
            Some(EventPayload::ApprovalDeleted(id)) => self.state.apply(Change::Deleted(id)),
            Some(EventPayload::ApprovalList(items)) => self.state.apply(Change::Snapshot(items)),
            Some(EventPayload::Error(message)) => self.state.backend_error(message),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helm_core::types::ApprovalStatus;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn approval_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id, "session_id": "s1", "function_call_id": "fc-1",
            "description": "install a package", "status": status,
            "created_at": 1, "updated_at": 1,
        })
    }

    #[tokio::test]
    async fn approve_pending_goes_to_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/approvals/ap-1/approve"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(approval_json("ap-1", "approved")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut store = ApprovalStore::new(ApiClient::new(server.uri()));
        store.handle_event(&PushEvent::new(
            "approval_added",
            json!({"approval": approval_json("ap-1", "pending")}),
        ));

        let approved = store.approve("ap-1").await.unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);
        // Local list still shows pending until the update event lands.
        assert_eq!(store.approvals()[0].status, ApprovalStatus::Pending);

        store.handle_event(&PushEvent::new(
            "approval_updated",
            json!({"approval": approval_json("ap-1", "approved")}),
        ));
        assert_eq!(store.approvals()[0].status, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn decided_approval_refuses_without_network() {
        // No mock mounted: a request would fail the test via a transport
        // error rather than the typed guard error.
        let server = MockServer::start().await;
        let mut store = ApprovalStore::new(ApiClient::new(server.uri()));
        store.handle_event(&PushEvent::new(
            "approval_added",
            json!({"approval": approval_json("ap-1", "approved")}),
        ));

        let err = store.reject("ap-1").await.unwrap_err();
        assert!(matches!(err, ClientError::Decided(_)));
        assert!(store.error().unwrap().contains("already decided"));
        assert_eq!(server.received_requests().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn rejected_is_also_terminal() {
        let server = MockServer::start().await;
        let mut store = ApprovalStore::new(ApiClient::new(server.uri()));
        store.handle_event(&PushEvent::new(
            "approval_added",
            json!({"approval": approval_json("ap-2", "rejected")}),
        ));
        assert!(store.approve("ap-2").await.is_err());
    }

    #[tokio::test]
    async fn unknown_id_passes_through_to_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/approvals/ghost/approve"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let mut store = ApprovalStore::new(ApiClient::new(server.uri()));
        let err = store.approve("ghost").await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
