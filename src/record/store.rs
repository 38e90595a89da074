use async_trait::async_trait;
use thiserror::Error;

use super::record::Record;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store conflict: {0}")]
    Conflict(String),
}

/// The persistence seam a batch run pages through.
///
/// Implementations must return pages in a stable order (creation order or any
/// other fixed key) so that consecutive offsets never skip or repeat records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn count(&self) -> Result<usize, StoreError>;

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Record>, StoreError>;

    /// Durably persist the category fields of exactly `records`, all or nothing.
    async fn commit(&self, records: &[Record]) -> Result<(), StoreError>;
}
