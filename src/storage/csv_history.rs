use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::HistoryMode;
use crate::models::{PriceSnapshotRow, Site, SENTINEL_PRICE};
use crate::parsers::format_price;
use crate::storage::{HistoryStore, TIMESTAMP_FORMAT};

const NAME_COLUMN: &str = "name";
const TIME_COLUMN: &str = "time";

/// Price history as a CSV file: `name`, one `<site>_price` column per site, `time`.
pub struct CsvHistory {
    path: PathBuf,
    mode: HistoryMode,
}

impl CsvHistory {
    pub fn new(path: impl Into<PathBuf>, mode: HistoryMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    fn header() -> Vec<String> {
        std::iter::once(NAME_COLUMN.to_string())
            .chain(Site::ALL.iter().map(Site::price_column))
            .chain(std::iter::once(TIME_COLUMN.to_string()))
            .collect()
    }

    fn has_content(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false)
    }

    fn open_for_cycle(&self) -> Result<(File, bool)> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }

        let append = self.mode == HistoryMode::Append && self.has_content();
        let file = if append {
            OpenOptions::new().append(true).open(&self.path)
        } else {
            File::create(&self.path)
        }
        .with_context(|| format!("Failed to open price history {:?}", self.path))?;

        Ok((file, !append))
    }
}

#[async_trait]
impl HistoryStore for CsvHistory {
    async fn append(&self, rows: &[PriceSnapshotRow]) -> Result<()> {
        let (file, write_header) = self.open_for_cycle()?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(Self::header())?;
        }

        for row in rows {
            let mut record = vec![row.name.clone()];
            record.extend(Site::ALL.iter().map(|site| format_price(row.price(*site))));
            record.push(row.captured_at.format(TIMESTAMP_FORMAT).to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;

        info!("Wrote {} rows to {:?}", rows.len(), self.path);
        Ok(())
    }

    async fn load(&self, name: Option<&str>) -> Result<Vec<PriceSnapshotRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_rows(&self.path, name)
    }

    async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {:?}", self.path))?;
        }
        Ok(())
    }
}

fn read_rows(path: &Path, name: Option<&str>) -> Result<Vec<PriceSnapshotRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open price history {:?}", path))?;

    let headers = reader.headers()?.clone();
    let column = |wanted: &str| headers.iter().position(|h| h == wanted);
    let name_idx = column(NAME_COLUMN)
        .with_context(|| format!("{:?} has no '{}' column", path, NAME_COLUMN))?;
    let time_idx = column(TIME_COLUMN)
        .with_context(|| format!("{:?} has no '{}' column", path, TIME_COLUMN))?;
    let price_idx: Vec<(Site, Option<usize>)> = Site::ALL
        .iter()
        .map(|site| (*site, column(site.price_column().as_str())))
        .collect();

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {} in {:?}: {}", i + 1, path, e);
                continue;
            }
        };

        let Some(row_name) = record.get(name_idx) else { continue };
        if name.is_some_and(|wanted| wanted != row_name) {
            continue;
        }

        let captured_at = record
            .get(time_idx)
            .and_then(|t| NaiveDateTime::parse_from_str(t.trim(), TIMESTAMP_FORMAT).ok());
        let Some(captured_at) = captured_at else {
            warn!("Row {} in {:?} has an unreadable time", i + 1, path);
            continue;
        };

        let mut row = PriceSnapshotRow::new(row_name, captured_at);
        for (site, idx) in price_idx.iter().copied() {
            let price = idx
                .and_then(|idx| record.get(idx))
                .and_then(|cell| cell.trim().parse::<f64>().ok())
                .unwrap_or(SENTINEL_PRICE);
            row.prices.insert(site, price);
        }
        rows.push(row);
    }

    Ok(rows)
}
