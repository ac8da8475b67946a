use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Site, SENTINEL_PRICE};

/// A tracked product and the page it is sold at on each site.
///
/// Site keys are free-form; only keys matching a [`Site`] are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub urls: BTreeMap<String, String>,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            urls: BTreeMap::new(),
        }
    }

    pub fn with_url(mut self, site: impl Into<String>, url: impl Into<String>) -> Self {
        self.set_url(site, url);
        self
    }

    pub fn url(&self, site: &str) -> Option<&str> {
        self.urls.get(site).map(String::as_str)
    }

    pub fn site_url(&self, site: Site) -> Option<&str> {
        self.url(site.key())
    }

    pub fn set_url(&mut self, site: impl Into<String>, url: impl Into<String>) {
        self.urls.insert(site.into(), url.into());
    }
}

/// Prices for one product captured during a refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshotRow {
    pub name: String,
    pub prices: BTreeMap<Site, f64>,
    pub captured_at: NaiveDateTime,
}

impl PriceSnapshotRow {
    /// A row with every known site at the sentinel price.
    pub fn new(name: impl Into<String>, captured_at: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            prices: Site::ALL.iter().map(|site| (*site, SENTINEL_PRICE)).collect(),
            captured_at,
        }
    }

    pub fn with_price(mut self, site: Site, price: f64) -> Self {
        self.prices.insert(site, price);
        self
    }

    pub fn price(&self, site: Site) -> f64 {
        self.prices.get(&site).copied().unwrap_or(SENTINEL_PRICE)
    }

    /// Cheapest site with a known price.
    pub fn cheapest(&self) -> Option<(Site, f64)> {
        Site::ALL
            .iter()
            .map(|site| (*site, self.price(*site)))
            .filter(|(_, price)| *price > SENTINEL_PRICE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_row_has_sentinel_for_every_site() {
        let row = PriceSnapshotRow::new("wingspan", noon());
        for site in Site::ALL {
            assert_eq!(row.price(site), 0.0);
        }
    }

    #[test]
    fn cheapest_skips_missing_prices() {
        let row = PriceSnapshotRow::new("wingspan", noon())
            .with_price(Site::Amazon, 45.0)
            .with_price(Site::DungeonDice, 42.5);
        assert_eq!(row.cheapest(), Some((Site::DungeonDice, 42.5)));

        let empty = PriceSnapshotRow::new("azul", noon());
        assert_eq!(empty.cheapest(), None);
    }

    #[test]
    fn set_url_overwrites_only_that_site() {
        let mut product = Product::new("azul")
            .with_url("amazon", "https://example/a")
            .with_url("feltrinelli", "https://example/f");
        product.set_url("amazon", "https://example/a2");
        assert_eq!(product.url("amazon"), Some("https://example/a2"));
        assert_eq!(product.site_url(Site::Feltrinelli), Some("https://example/f"));
        assert_eq!(product.site_url(Site::DungeonDice), None);
    }
}
