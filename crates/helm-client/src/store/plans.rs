//! Plan list store. Same shape as todos, separate list and endpoints.

use helm_core::events::{EventPayload, PushEvent};
use helm_core::types::{PlanCreate, PlanItem, PlanUpdate};
use tracing::warn;

use super::{Change, ListState};
use crate::api::ApiClient;
use crate::error::Result;

/// Plans: fetch-on-start plus event-driven patching.
pub struct PlanStore {
    api: ApiClient,
    state: ListState<PlanItem>,
}

impl PlanStore {
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
    pub fn plans(&self) -> &[PlanItem] {
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
    pub async fn fetch(&mut self, session_id: Option<&str>) {
        self.state.begin_fetch();
        match self.api.list_plans(session_id).await {
            Ok(plans) => self.state.finish_fetch(plans),
            Err(error) => {
                warn!(%error, "failed to fetch plans");
                self.state.fail_fetch(&error);
            }
        }
    }

    /// Create a plan item; insertion follows the push event.
    pub async fn add(&mut self, fields: PlanCreate) -> Result<PlanItem> {
        let result = self.api.create_plan(&fields).await;
        self.mutate(result)
    }

    /// Update a plan item with only the changed fields.
    pub async fn update(&mut self, id: &str, fields: PlanUpdate) -> Result<PlanItem> {
        let result = self.api.update_plan(id, &fields).await;
        self.mutate(result)
    }

    /// Flip completion server-side.
    pub async fn toggle(&mut self, id: &str) -> Result<PlanItem> {
        let result = self.api.toggle_plan(id).await;
        self.mutate(result)
    }

    /// Delete a plan item; removal follows the push event.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let result = self.api.delete_plan(id).await;
        self.mutate(result)
    }

    fn mutate<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.state.error = None;
                Ok(value)
            }
            Err(error) => {
                warn!(%error, "plan mutation failed");
                self.state.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Apply a push event if it concerns plans.
    pub fn handle_event(&mut self, event: &PushEvent) {
        match event.typed_payload() {
            Some(EventPayload::PlanAdded(plan)) => self.state.apply(Change::Added(plan)),
            Some(EventPayload::PlanUpdated(plan)) => self.state.apply(Change::Updated(plan)),
            Some(EventPayload::PlanDeleted(id)) => self.state.apply(Change::Deleted(id)),
            Some(EventPayload::PlanList(plans)) => self.state.apply(Change::Snapshot(plans)),
            Some(EventPayload::Error(message)) => self.state.backend_error(message),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan_json(id: &str) -> serde_json::Value {
        json!({
            "id": id, "title": "t", "completed": false,
            "created_at": 1, "updated_at": 1,
        })
    }

    fn store() -> PlanStore {
        PlanStore::new(ApiClient::new("http://localhost:0"))
    }

    #[test]
    fn plan_events_patch_the_list() {
        let mut store = store();
        store.handle_event(&PushEvent::new("plan_added", json!({"plan": plan_json("p1")})));
        store.handle_event(&PushEvent::new("plan_added", json!({"plan": plan_json("p2")})));
        store.handle_event(&PushEvent::new("plan_deleted", json!({"planId": "p1"})));
        assert_eq!(store.plans().len(), 1);
        assert_eq!(store.plans()[0].id, "p2");
    }

    #[test]
    fn todo_events_do_not_leak_into_plans() {
        let mut store = store();
        store.handle_event(&PushEvent::new("todo_added", json!({"todo": plan_json("t1")})));
        assert!(store.plans().is_empty());
    }

    #[test]
    fn legacy_type_envelope_applies_too() {
        let mut store = store();
        let event = PushEvent::parse(&format!(
            r#"{{"type":"plan_added","data":{{"plan":{}}}}}"#,
            plan_json("p1")
        ))
        .unwrap();
        store.handle_event(&event);
        assert_eq!(store.plans().len(), 1);
    }
}
