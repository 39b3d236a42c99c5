//! File browser store.
//!
//! The backend serves a flat listing; the store rebuilds the hierarchy
//! by path prefix on every fetch. File events are coarse: any
//! `file_created` / `file_deleted` / `file_list` triggers a refetch
//! rather than incremental patching, since a single change can reshape
//! the tree.

use helm_core::events::{EventPayload, PushEvent};
use helm_core::types::{FileNode, build_file_tree};
use tracing::warn;

use crate::api::ApiClient;

/// The reconstructed file tree plus fetch state.
pub struct FileStore {
    api: ApiClient,
    files: Vec<FileNode>,
    loading: bool,
    error: Option<String>,
}

impl FileStore {
    /// Create a store backed by the given API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            files: Vec::new(),
            loading: false,
            error: None,
        }
    }

    /// The current tree roots.
    #[must_use]
    pub fn files(&self) -> &[FileNode] {
        &self.files
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Most recent error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the flat listing and rebuild the tree. On failure the
    /// previous tree stays intact.
    pub async fn fetch(&mut self) {
        self.loading = true;
        self.error = None;
        match self.api.list_files().await {
            Ok(flat) => {
                self.files = build_file_tree(&flat);
            }
            Err(error) => {
                warn!(%error, "failed to fetch files");
                self.error = Some(error.to_string());
            }
        }
        self.loading = false;
    }

    /// React to a push event; file events trigger a refetch.
    pub async fn handle_event(&mut self, event: &PushEvent) {
        if matches!(event.typed_payload(), Some(EventPayload::FilesChanged)) {
            self.fetch().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing() -> serde_json::Value {
        json!([
            {"id": "d1", "name": "src", "type": "folder", "path": "src", "updated_at": 1},
            {"id": "f1", "name": "lib.rs", "type": "file", "size": 9,
             "path": "src/lib.rs", "updated_at": 2},
        ])
    }

    #[tokio::test]
    async fn fetch_builds_the_tree() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .mount(&server)
            .await;

        let mut store = FileStore::new(ApiClient::new(server.uri()));
        store.fetch().await;

        assert_eq!(store.files().len(), 1);
        let src = &store.files()[0];
        assert_eq!(src.path, "src");
        assert_eq!(src.children.as_ref().unwrap()[0].name, "lib.rs");
    }

    #[tokio::test]
    async fn file_events_trigger_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .expect(1)
            .mount(&server)
            .await;

        let mut store = FileStore::new(ApiClient::new(server.uri()));
        store
            .handle_event(&PushEvent::new("file_created", json!({})))
            .await;
        assert_eq!(store.files().len(), 1);
    }

    #[tokio::test]
    async fn non_file_events_do_not_refetch() {
        let server = MockServer::start().await;
        // No mock mounted: a refetch would record a transport error.
        let mut store = FileStore::new(ApiClient::new(server.uri()));
        store
            .handle_event(&PushEvent::new("todo_added", json!({})))
            .await;
        assert!(store.error().is_none());
        assert_eq!(server.received_requests().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_tree() {
        let server = MockServer::start().await;
        let ok = Mock::given(method("GET"))
            .and(path("/api/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .expect(1)
            .mount_as_scoped(&server)
            .await;
        let mut store = FileStore::new(ApiClient::new(server.uri()));
        store.fetch().await;
        assert_eq!(store.files().len(), 1);
        drop(ok);

        Mock::given(method("GET"))
            .and(path("/api/files"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        store.fetch().await;
        assert_eq!(store.files().len(), 1);
        assert!(store.error().unwrap().contains("502"));
    }
}
