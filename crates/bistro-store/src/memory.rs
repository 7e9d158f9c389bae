use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bistro_types::domain::order::OrderRecord;
use bistro_types::ports::order_store::{OrderStore, StoreError};

/// Insertion-ordered in-memory log, shared across clones.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    log: Arc<Mutex<Vec<OrderRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn append(&self, record: OrderRecord) -> Result<(), StoreError> {
        let mut log = self
            .log
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        log.push(record);
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let log = self
            .log
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(log.clone())
    }
}
