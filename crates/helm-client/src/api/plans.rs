//! `/api/plans` endpoint wrappers.

use helm_core::types::{PlanCreate, PlanItem, PlanUpdate};
use reqwest::Method;

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// `GET /api/plans`, optionally scoped to a session.
    pub async fn list_plans(&self, session_id: Option<&str>) -> Result<Vec<PlanItem>> {
        let query: Vec<(&str, &str)> = session_id.map(|s| ("session_id", s)).into_iter().collect();
        self.get_json("/api/plans", &query).await
    }

    /// `POST /api/plans`.
    pub async fn create_plan(&self, fields: &PlanCreate) -> Result<PlanItem> {
        self.send_json(Method::POST, "/api/plans", fields).await
    }

    /// `PUT /api/plans/{id}` with only the changed fields.
    pub async fn update_plan(&self, id: &str, fields: &PlanUpdate) -> Result<PlanItem> {
        self.send_json(Method::PUT, &format!("/api/plans/{id}"), fields)
            .await
    }

    /// `PATCH /api/plans/{id}/toggle`: no body, flips `completed`
    /// server-side.
    pub async fn toggle_plan(&self, id: &str) -> Result<PlanItem> {
        self.send_empty(Method::PATCH, &format!("/api/plans/{id}/toggle"))
            .await
    }

    /// `DELETE /api/plans/{id}`.
    pub async fn delete_plan(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/plans/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_and_toggle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plans"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "p1", "title": "ship it", "completed": false,
                "created_at": 1, "updated_at": 1,
            }])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/plans/p1/toggle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "p1", "title": "ship it", "completed": true,
                "created_at": 1, "updated_at": 2,
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let plans = client.list_plans(None).await.unwrap();
        assert_eq!(plans.len(), 1);
        let toggled = client.toggle_plan("p1").await.unwrap();
        assert!(toggled.completed);
    }
}
