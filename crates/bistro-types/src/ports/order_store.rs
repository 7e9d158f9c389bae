use async_trait::async_trait;

use crate::domain::order::OrderRecord;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(String),
    #[error("store encoding error: {0}")]
    Encode(String),
}

/// Append-only order log. No update, no delete, no indexing; callers that
/// need lookups scan the result of `read_all`.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    async fn append(&self, record: OrderRecord) -> Result<(), StoreError>;
    async fn read_all(&self) -> Result<Vec<OrderRecord>, StoreError>;
}
