//! Record sources
//!
//! A [`RecordSource`] is the only boundary between the metrics engine and
//! the hosted backend. It answers one kind of request: "give me these
//! columns of every interaction row, in this order".
//!
//! ## Implementations
//!
//! - [`RestSource`]: PostgREST-style HTTP API of the hosted backend
//! - [`SnapshotSource`]: JSON array of rows exported to a file
//! - [`MemorySource`]: rows held in memory, with a failure switch for tests
//!
//! Sources must return rows in the requested order. The metrics engine does
//! not re-sort anything except daily buckets.

mod memory;
mod rest;
mod snapshot;

pub use memory::MemorySource;
pub use rest::RestSource;
pub use snapshot::SnapshotSource;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::InteractionRecord;

/// Backend column of an interaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Name,
    Contact,
    MessageText,
    MessageCount,
    CreatedAt,
    IsTalking,
    Stage,
    PreviousMessage,
    IsFinished,
}

impl Column {
    /// Column name as stored in the backend table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Contact => "whatsapp",
            Column::MessageText => "messages",
            Column::MessageCount => "message_id",
            Column::CreatedAt => "created_at",
            Column::IsTalking => "talking",
            Column::Stage => "stage",
            Column::PreviousMessage => "prev_msg",
            Column::IsFinished => "finish",
        }
    }
}

/// Which columns to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Every column (`select=*`)
    All,
    /// Only the listed columns. `created_at` is always added.
    Columns(&'static [Column]),
}

impl Projection {
    /// Render as a `select` parameter value.
    pub fn select_clause(&self) -> String {
        match self {
            Projection::All => "*".to_string(),
            Projection::Columns(columns) => {
                let mut names: Vec<&str> = columns.iter().map(Column::as_str).collect();
                if !columns.contains(&Column::CreatedAt) {
                    names.push(Column::CreatedAt.as_str());
                }
                names.join(",")
            }
        }
    }
}

/// Ordering by `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// A single fetch against a record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub projection: Projection,
    /// `None` leaves row order to the backend
    pub order: Option<SortOrder>,
    pub limit: Option<usize>,
}

impl FetchRequest {
    /// Every column, unordered.
    pub fn all() -> Self {
        Self {
            projection: Projection::All,
            order: None,
            limit: None,
        }
    }

    /// Only the given columns, unordered.
    pub fn columns(columns: &'static [Column]) -> Self {
        Self {
            projection: Projection::Columns(columns),
            order: None,
            limit: None,
        }
    }

    pub fn ordered(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Returns interaction records on request.
///
/// Implementations fail with [`SourceError`] on transport, auth, or query
/// failure and never return partial results.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short name for logs (e.g., "rest", "snapshot")
    fn name(&self) -> &str;

    /// Fetch rows matching `request`.
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<InteractionRecord>, SourceError>;
}

/// Apply ordering and limit in memory, for sources without a query engine.
pub(crate) fn apply_request(
    mut records: Vec<InteractionRecord>,
    request: &FetchRequest,
) -> Vec<InteractionRecord> {
    match request.order {
        Some(SortOrder::Ascending) => records.sort_by_key(|r| r.created_at),
        Some(SortOrder::Descending) => {
            records.sort_by(|a, b| b.created_at.cmp(&a.created_at))
        }
        None => {}
    }
    if let Some(limit) = request.limit {
        records.truncate(limit);
    }
    records
}
