use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::{HistoryBackend, StorageConfig};
use crate::models::PriceSnapshotRow;

mod csv_history;
mod registry;
mod sqlite;

pub use csv_history::CsvHistory;
pub use registry::{ProductRegistry, Upsert};
pub use sqlite::SqliteHistory;

/// Format used for capture timestamps in every history backend.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Persisted log of snapshot rows.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist every row of one refresh cycle.
    async fn append(&self, rows: &[PriceSnapshotRow]) -> Result<()>;
    /// Stored rows, oldest first, optionally restricted to one product.
    async fn load(&self, name: Option<&str>) -> Result<Vec<PriceSnapshotRow>>;
    async fn clear(&self) -> Result<()>;
}

pub async fn open_history(config: &StorageConfig) -> Result<Box<dyn HistoryStore>> {
    match config.history_backend {
        HistoryBackend::Csv => {
            info!("Price history: CSV {:?} ({:?})", config.prices_csv, config.history_mode);
            Ok(Box::new(CsvHistory::new(&config.prices_csv, config.history_mode)))
        }
        HistoryBackend::Sqlite => {
            info!("Price history: SQLite {:?}", config.history_db);
            let store = SqliteHistory::new(&config.history_db).await?;
            store.migrate().await?;
            Ok(Box::new(store))
        }
    }
}
