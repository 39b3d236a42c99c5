//! `/api/todos` endpoint wrappers.

use helm_core::types::{TodoCreate, TodoItem, TodoUpdate};
use reqwest::Method;

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// `GET /api/todos`, optionally scoped to a session.
    pub async fn list_todos(&self, session_id: Option<&str>) -> Result<Vec<TodoItem>> {
        let query: Vec<(&str, &str)> = session_id.map(|s| ("session_id", s)).into_iter().collect();
        self.get_json("/api/todos", &query).await
    }

    /// `POST /api/todos`.
    pub async fn create_todo(&self, fields: &TodoCreate) -> Result<TodoItem> {
        self.send_json(Method::POST, "/api/todos", fields).await
    }

    /// `PUT /api/todos/{id}` with only the changed fields.
    pub async fn update_todo(&self, id: &str, fields: &TodoUpdate) -> Result<TodoItem> {
        self.send_json(Method::PUT, &format!("/api/todos/{id}"), fields)
            .await
    }

    /// `PATCH /api/todos/{id}/toggle`: no body, flips `completed`
    /// server-side.
    pub async fn toggle_todo(&self, id: &str) -> Result<TodoItem> {
        self.send_empty(Method::PATCH, &format!("/api/todos/{id}/toggle"))
            .await
    }

    /// `DELETE /api/todos/{id}`.
    pub async fn delete_todo(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/todos/{id}")).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn todo_json(id: &str, title: &str) -> serde_json::Value {
        json!({
            "id": id, "title": title, "completed": false,
            "created_at": 1, "updated_at": 1,
        })
    }

    #[tokio::test]
    async fn list_todos_plain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([todo_json("t1", "a"), todo_json("t2", "b")])),
            )
            .mount(&server)
            .await;

        let todos = ApiClient::new(server.uri()).list_todos(None).await.unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].id, "t1");
    }

    #[tokio::test]
    async fn list_todos_scoped_to_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .and(query_param("session_id", "s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([todo_json("t1", "a")])))
            .mount(&server)
            .await;

        let todos = ApiClient::new(server.uri())
            .list_todos(Some("s1"))
            .await
            .unwrap();
        assert_eq!(todos.len(), 1);
    }

    #[tokio::test]
    async fn create_todo_sends_only_set_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/todos"))
            .and(body_json(json!({"title": "buy milk"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(todo_json("t9", "buy milk")))
            .mount(&server)
            .await;

        let todo = ApiClient::new(server.uri())
            .create_todo(&TodoCreate {
                title: "buy milk".into(),
                ..TodoCreate::default()
            })
            .await
            .unwrap();
        assert_eq!(todo.id, "t9");
    }

    #[tokio::test]
    async fn toggle_hits_dedicated_endpoint_with_no_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/todos/t1/toggle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t1", "title": "a", "completed": true,
                "created_at": 1, "updated_at": 2,
            })))
            .mount(&server)
            .await;

        let todo = ApiClient::new(server.uri()).toggle_todo("t1").await.unwrap();
        assert!(todo.completed);
    }

    #[tokio::test]
    async fn delete_todo_ok() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/todos/t1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        ApiClient::new(server.uri()).delete_todo("t1").await.unwrap();
    }

    #[tokio::test]
    async fn delete_todo_failure_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/todos/t1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such todo"))
            .mount(&server)
            .await;

        let err = ApiClient::new(server.uri())
            .delete_todo("t1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
