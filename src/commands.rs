//! Chat-style command surface over the registry, refresh cycle and history.
//!
//! Every command produces a reply; failures become a short message instead
//! of being dropped.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Subcommand;
use reqwest::Client;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

use crate::config::Config;
use crate::discord;
use crate::models::{PriceSnapshotRow, Site};
use crate::report::{compare_table, display_name, history_table, product_list_table, update_message};
use crate::snapshot::SnapshotBuilder;
use crate::storage::{open_history, HistoryStore, ProductRegistry, Upsert};
use crate::utils::{create_client, HttpFetcher, PageFetcher};

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Track a product on a site, or change the page it is tracked at
    Add {
        /// Product name, e.g. forbidden_city
        name: String,
        /// Site key: amazon, dungeondice or feltrinelli
        site: String,
        url: String,
    },
    /// List tracked products
    List,
    /// Fetch current prices, store them and show the table
    Update,
    /// Show the cheapest site for each product from the latest prices
    Compare,
    /// Show every stored price of one product
    History { name: String },
    /// Delete the stored price history
    Reset,
}

pub struct Tracker {
    config: Config,
    registry: ProductRegistry,
    history: Box<dyn HistoryStore>,
    builder: SnapshotBuilder,
    client: Client,
}

impl Tracker {
    pub async fn open(config: Config) -> Result<Self> {
        let client = create_client(&config.http)?;
        let registry = ProductRegistry::open(&config.storage.products_csv)?;
        let history = open_history(&config.storage).await?;
        let fetcher = Arc::new(HttpFetcher::new(client.clone()));

        Ok(Self::new(config, registry, history, fetcher, client))
    }

    pub fn new(
        config: Config,
        registry: ProductRegistry,
        history: Box<dyn HistoryStore>,
        fetcher: Arc<dyn PageFetcher>,
        client: Client,
    ) -> Self {
        Self {
            config,
            registry,
            history,
            builder: SnapshotBuilder::new(fetcher),
            client,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one command and always produce a reply.
    pub async fn run(&mut self, command: Command) -> String {
        let (label, result) = match command {
            Command::Add { name, site, url } => ("Add", self.add(&name, &site, &url)),
            Command::List => ("List", self.list()),
            Command::Update => ("Update", self.update().await),
            Command::Compare => ("Compare", self.compare().await),
            Command::History { name } => ("History", self.history(&name).await),
            Command::Reset => ("Reset", self.reset().await),
        };

        result.unwrap_or_else(|e| {
            error!("{} failed: {:#}", label, e);
            format!("{} failed: {}", label, e)
        })
    }

    pub fn add(&mut self, name: &str, site: &str, url: &str) -> Result<String> {
        let site = site.trim().to_lowercase();
        Url::parse(url).with_context(|| format!("'{}' is not a valid URL", url))?;

        if Site::from_key(&site).is_none() {
            warn!("No price extractor for site '{}', it will not be refreshed", site);
        }

        self.registry.reload()?;
        let reply = match self.registry.upsert(name, &site, url)? {
            Upsert::Created => format!("Added {} on {}", display_name(name), site),
            Upsert::Updated => format!("Updated {} on {}", display_name(name), site),
        };
        Ok(reply)
    }

    pub fn list(&mut self) -> Result<String> {
        self.registry.reload()?;
        let table = product_list_table(self.registry.list_products());
        Ok(format!("```\n{}\n```", table.render()))
    }

    /// Full refresh cycle: fetch, persist, render and notify.
    pub async fn update(&mut self) -> Result<String> {
        self.registry.reload()?;
        let rows = self
            .builder
            .build_snapshot(self.registry.list_products())
            .await;

        if self.config.storage.save_history {
            self.history
                .append(&rows)
                .await
                .context("Failed to store prices")?;
        }

        let message = update_message(&rows, Local::now().naive_local());
        self.notify(&message).await;
        Ok(message)
    }

    pub async fn compare(&self) -> Result<String> {
        let latest = latest_per_product(self.history.load(None).await?);
        if latest.is_empty() {
            return Ok("No prices stored yet, run update first.".to_string());
        }
        Ok(format!("```\n{}\n```", compare_table(&latest).render()))
    }

    pub async fn history(&self, name: &str) -> Result<String> {
        let rows = self.history.load(Some(name)).await?;
        if rows.is_empty() {
            return Ok(format!("No price history for {}", display_name(name)));
        }
        Ok(format!(
            "{}\n```\n{}\n```",
            display_name(name),
            history_table(&rows).render()
        ))
    }

    pub async fn reset(&self) -> Result<String> {
        self.history.clear().await?;
        info!("Price history cleared");
        Ok("Price history cleared.".to_string())
    }

    async fn notify(&self, message: &str) {
        let Some(webhook) = &self.config.discord.webhook else {
            return;
        };
        if let Err(e) = discord::send_report(&self.client, webhook, message).await {
            error!("Failed to send Discord report: {:#}", e);
        }
    }
}

/// Latest row of each product, in order of first appearance.
fn latest_per_product(rows: Vec<PriceSnapshotRow>) -> Vec<PriceSnapshotRow> {
    let mut latest: Vec<PriceSnapshotRow> = Vec::new();
    for row in rows {
        match latest.iter_mut().find(|r| r.name == row.name) {
            Some(slot) => *slot = row,
            None => latest.push(row),
        }
    }
    latest
}
