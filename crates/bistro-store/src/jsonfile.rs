use std::path::PathBuf;

use async_trait::async_trait;
use bistro_types::domain::order::OrderRecord;
use bistro_types::ports::order_store::{OrderStore, StoreError};
use tokio::sync::Mutex;

/// Flat pretty-printed JSON array file. A missing, unreadable, or
/// non-array file reads as an empty log; appends go through `write_lock`
/// so overlapping requests in this process cannot drop each other's
/// records.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn new(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path: PathBuf = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    async fn read_log(&self) -> Vec<OrderRecord> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to read order log");
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<OrderRecord>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "order log is not a record array");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl OrderStore for JsonFileStore {
    async fn append(&self, record: OrderRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_log().await;
        records.push(record);
        let bytes =
            serde_json::to_vec_pretty(&records).map_err(|e| StoreError::Encode(e.to_string()))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    async fn read_all(&self) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self.read_log().await)
    }
}
