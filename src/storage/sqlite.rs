use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::models::{PriceSnapshotRow, Site};
use crate::storage::{HistoryStore, TIMESTAMP_FORMAT};

/// Price history in SQLite, one row per (product, site, capture time).
///
/// Always appends; the history mode setting only applies to the CSV backend.
pub struct SqliteHistory {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistory {
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open SQLite database {:?}", db_path))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection lock poisoned"))
    }

    pub async fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS price_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                site TEXT NOT NULL,
                price REAL NOT NULL,
                captured_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_price_history_name ON price_history(name)",
            [],
        )?;

        info!("Database migration completed");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistory {
    async fn append(&self, rows: &[PriceSnapshotRow]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for row in rows {
            let captured_at = row.captured_at.format(TIMESTAMP_FORMAT).to_string();
            for site in Site::ALL {
                tx.execute(
                    "INSERT INTO price_history (name, site, price, captured_at) VALUES (?1, ?2, ?3, ?4)",
                    params![row.name, site.key(), row.price(site), captured_at],
                )
                .with_context(|| format!("insert price {} {}", row.name, site))?;
            }
        }

        tx.commit()?;
        info!("Stored {} rows in price history", rows.len());
        Ok(())
    }

    async fn load(&self, name: Option<&str>) -> Result<Vec<PriceSnapshotRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT name, site, price, captured_at FROM price_history
             WHERE ?1 IS NULL OR name = ?1
             ORDER BY id",
        )?;

        let records = stmt
            .query_map(params![name], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, f64>(2)?,
                    r.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut rows: Vec<PriceSnapshotRow> = Vec::new();
        for (row_name, site_key, price, captured_at) in records {
            let Some(site) = Site::from_key(&site_key) else {
                warn!("Ignoring price for unknown site '{}'", site_key);
                continue;
            };
            let captured_at = NaiveDateTime::parse_from_str(&captured_at, TIMESTAMP_FORMAT)
                .with_context(|| format!("Bad timestamp '{}' for {}", captured_at, row_name))?;

            // Sites of one row were inserted consecutively.
            if let Some(last) = rows
                .last_mut()
                .filter(|last| last.name == row_name && last.captured_at == captured_at)
            {
                last.prices.insert(site, price);
                continue;
            }
            rows.push(PriceSnapshotRow::new(row_name, captured_at).with_price(site, price));
        }

        Ok(rows)
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM price_history", [])?;
        info!("Removed {} price records", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    async fn store() -> SqliteHistory {
        let store = SqliteHistory::in_memory().unwrap();
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn append_then_load() {
        let store = store().await;
        let rows = vec![
            PriceSnapshotRow::new("wingspan", at(9)).with_price(Site::Amazon, 45.0),
            PriceSnapshotRow::new("azul", at(9)).with_price(Site::Feltrinelli, 29.9),
        ];
        store.append(&rows).await.unwrap();
        assert_eq!(store.load(None).await.unwrap(), rows);
    }

    #[tokio::test]
    async fn keeps_every_cycle() {
        let store = store().await;
        store
            .append(&[PriceSnapshotRow::new("azul", at(9)).with_price(Site::Amazon, 30.0)])
            .await
            .unwrap();
        store
            .append(&[PriceSnapshotRow::new("azul", at(10)).with_price(Site::Amazon, 28.0)])
            .await
            .unwrap();

        let history = store.load(Some("azul")).await.unwrap();
        let prices: Vec<f64> = history.iter().map(|r| r.price(Site::Amazon)).collect();
        assert_eq!(prices, vec![30.0, 28.0]);
        assert!(store.load(Some("wingspan")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_table() {
        let store = store().await;
        store
            .append(&[PriceSnapshotRow::new("azul", at(9))])
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert!(store.load(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persists_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history").join("prices.db");
        let rows = vec![PriceSnapshotRow::new("azul", at(9)).with_price(Site::DungeonDice, 31.5)];

        let first = SqliteHistory::new(&path).await.unwrap();
        first.migrate().await.unwrap();
        first.append(&rows).await.unwrap();
        drop(first);

        let second = SqliteHistory::new(&path).await.unwrap();
        second.migrate().await.unwrap();
        assert_eq!(second.load(None).await.unwrap(), rows);
    }
}
