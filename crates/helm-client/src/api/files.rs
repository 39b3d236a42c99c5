//! `/api/files` endpoint wrappers.

use helm_core::types::FileRecord;

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// `GET /api/files`: flat listing; the store rebuilds the hierarchy.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.get_json("/api/files", &[]).await
    }
}
