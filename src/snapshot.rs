//! Refresh cycle: fetch every tracked page and read its price.

use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::{PriceSnapshotRow, Product, SENTINEL_PRICE};
use crate::scrapers::{all_extractors, PriceExtractor};
use crate::utils::PageFetcher;

pub struct SnapshotBuilder {
    fetcher: Arc<dyn PageFetcher>,
    extractors: Vec<Box<dyn PriceExtractor>>,
}

impl SnapshotBuilder {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            extractors: all_extractors(),
        }
    }

    /// One row per product, sites in fixed order, fetched one after another.
    ///
    /// A failed fetch records the sentinel price for that site only; the
    /// rest of the cycle carries on. Each row is stamped when its product's
    /// fetches complete.
    pub async fn build_snapshot(&self, products: &[Product]) -> Vec<PriceSnapshotRow> {
        info!("Refreshing prices for {} products", products.len());
        let mut rows = Vec::with_capacity(products.len());

        for product in products {
            let mut prices = Vec::with_capacity(self.extractors.len());

            for extractor in &self.extractors {
                let site = extractor.site();
                let url = product.site_url(site);

                let price = match self.fetcher.fetch(url).await {
                    Ok(html) => extractor.extract(&html),
                    Err(e) => {
                        warn!("{} on {}: {:#}", product.name, site, e);
                        SENTINEL_PRICE
                    }
                };

                debug!("{} on {}: {}", product.name, site, price);
                prices.push((site, price));
            }

            let mut row = PriceSnapshotRow::new(product.name.clone(), Local::now().naive_local());
            row.prices.extend(prices);
            rows.push(row);
        }

        rows
    }
}
