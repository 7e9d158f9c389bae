#[cfg(not(any(feature = "memory", feature = "jsonfile")))]
compile_error!("Enable a store feature: `memory` or `jsonfile`.");

use bistro_types::domain::order::OrderRecord;
use bistro_types::ports::order_store::{OrderStore, StoreError};

#[cfg(feature = "jsonfile")]
pub mod jsonfile;
#[cfg(feature = "memory")]
pub mod memory;

pub struct Store {
    #[cfg(all(feature = "memory", not(feature = "jsonfile")))]
    memory: memory::InMemoryStore,
    #[cfg(feature = "jsonfile")]
    jsonfile: jsonfile::JsonFileStore,
}

pub async fn build_store(path: Option<&std::path::Path>) -> anyhow::Result<Store> {
    Store::build_store(path).await
}

impl Store {
    #[cfg(all(feature = "memory", not(feature = "jsonfile")))]
    pub async fn build_store(_: Option<&std::path::Path>) -> anyhow::Result<Self> {
        Ok(Self {
            memory: memory::InMemoryStore::new(),
        })
    }

    // With both features enabled the file adapter backs the store; the
    // memory adapter stays available for tests.
    #[cfg(feature = "jsonfile")]
    pub async fn build_store(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let path = path.unwrap_or_else(|| std::path::Path::new("data/orders.json"));
        let jsonfile = jsonfile::JsonFileStore::new(path).await?;
        Ok(Self { jsonfile })
    }
}

#[cfg(all(feature = "memory", not(feature = "jsonfile")))]
#[async_trait::async_trait]
impl OrderStore for Store {
    async fn append(&self, record: OrderRecord) -> Result<(), StoreError> {
        self.memory.append(record).await
    }

    async fn read_all(&self) -> Result<Vec<OrderRecord>, StoreError> {
        self.memory.read_all().await
    }
}

#[cfg(feature = "jsonfile")]
#[async_trait::async_trait]
impl OrderStore for Store {
    async fn append(&self, record: OrderRecord) -> Result<(), StoreError> {
        self.jsonfile.append(record).await
    }

    async fn read_all(&self) -> Result<Vec<OrderRecord>, StoreError> {
        self.jsonfile.read_all().await
    }
}
