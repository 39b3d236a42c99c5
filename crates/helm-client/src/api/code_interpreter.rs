//! `/api/code-interpreter/states` endpoint wrappers.

use helm_core::types::{CodeInterpreterCreate, CodeInterpreterState, CodeInterpreterUpdate};
use reqwest::Method;

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// `GET /api/code-interpreter/states`.
    pub async fn list_code_interpreter_states(&self) -> Result<Vec<CodeInterpreterState>> {
        self.get_json("/api/code-interpreter/states", &[]).await
    }

    /// `GET /api/code-interpreter/states/{id}`.
    pub async fn get_code_interpreter_state(&self, id: &str) -> Result<CodeInterpreterState> {
        self.get_json(&format!("/api/code-interpreter/states/{id}"), &[])
            .await
    }

    /// `POST /api/code-interpreter/states`.
    pub async fn create_code_interpreter_state(
        &self,
        fields: &CodeInterpreterCreate,
    ) -> Result<CodeInterpreterState> {
        self.send_json(Method::POST, "/api/code-interpreter/states", fields)
            .await
    }

    /// `PUT /api/code-interpreter/states/{id}` with only the changed
    /// fields.
    pub async fn update_code_interpreter_state(
        &self,
        id: &str,
        fields: &CodeInterpreterUpdate,
    ) -> Result<CodeInterpreterState> {
        self.send_json(
            Method::PUT,
            &format!("/api/code-interpreter/states/{id}"),
            fields,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helm_core::types::CodeInterpreterStatus;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id, "session_id": "s1", "ticket_id": "tk1",
            "code": "print(1)", "status": status,
            "created_at": 1, "updated_at": 1,
        })
    }

    #[tokio::test]
    async fn create_posts_session_and_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/code-interpreter/states"))
            .and(body_json(json!({"session_id": "s1", "code": "print(1)"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(state_json("ci1", "pending")))
            .mount(&server)
            .await;

        let state = ApiClient::new(server.uri())
            .create_code_interpreter_state(&CodeInterpreterCreate {
                session_id: "s1".into(),
                code: "print(1)".into(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(state.status, CodeInterpreterStatus::Pending);
    }

    #[tokio::test]
    async fn update_sends_partial_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/code-interpreter/states/ci1"))
            .and(body_json(json!({"status": "completed", "result": "42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_json("ci1", "completed")))
            .mount(&server)
            .await;

        let state = ApiClient::new(server.uri())
            .update_code_interpreter_state(
                "ci1",
                &CodeInterpreterUpdate {
                    status: Some(CodeInterpreterStatus::Completed),
                    result: Some("42".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(state.status, CodeInterpreterStatus::Completed);
    }
}
