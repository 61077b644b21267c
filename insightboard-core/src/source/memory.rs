//! In-memory record source.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{apply_request, FetchRequest, RecordSource};
use crate::error::SourceError;
use crate::types::InteractionRecord;

/// Record source holding rows in memory.
///
/// Clones share the same rows and failure switch, so a test can keep a
/// handle while the dashboard owns another.
#[derive(Clone, Default)]
pub struct MemorySource {
    records: Arc<Mutex<Vec<InteractionRecord>>>,
    failure: Arc<Mutex<Option<SourceError>>>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl MemorySource {
    pub fn new(records: Vec<InteractionRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Default::default()
        }
    }

    /// Make every subsequent fetch fail with `error` (or succeed again with `None`).
    pub fn set_failure(&self, error: Option<SourceError>) {
        *self.failure.lock() = error;
    }

    /// Every request served so far, in arrival order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<InteractionRecord>, SourceError> {
        self.requests.lock().push(*request);

        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }

        let records = self.records.lock().clone();
        Ok(apply_request(records, request))
    }
}
