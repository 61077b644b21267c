//! Record source reading an exported JSON snapshot.
//!
//! The file holds the same JSON array the REST API returns for `select=*`.
//! It is re-read on every fetch so edits show up on the next refresh.

use std::path::PathBuf;

use async_trait::async_trait;

use super::rest::decode_rows;
use super::{apply_request, FetchRequest, RecordSource};
use crate::error::SourceError;
use crate::types::InteractionRecord;

pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for SnapshotSource {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<InteractionRecord>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::Snapshot {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        let records = decode_rows(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            rows = records.len(),
            "Loaded snapshot"
        );

        Ok(apply_request(records, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SortOrder;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_snapshot_source_reads_and_orders() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 2, "created_at": "2024-02-02T10:00:00+00:00"},
                {"id": 1, "created_at": "2024-02-01T10:00:00+00:00"}
            ]"#,
        )
        .unwrap();

        let source = SnapshotSource::new(&path);
        let rows = source
            .fetch(&FetchRequest::all().ordered(SortOrder::Ascending))
            .await
            .unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_snapshot_source_missing_file() {
        let source = SnapshotSource::new("/nonexistent/rows.json");
        let err = source.fetch(&FetchRequest::all()).await.unwrap_err();
        assert!(matches!(err, SourceError::Snapshot { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_source_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "[{\"id\": 1}]").unwrap();

        let err = SnapshotSource::new(&path)
            .fetch(&FetchRequest::all())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }
}
