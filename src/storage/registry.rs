use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::models::{Product, Site};

const NAME_COLUMN: &str = "name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Tracked products, persisted as a CSV file with one column per site.
///
/// Every mutation rewrites the whole file. There is no locking, so two
/// writers racing on the same file lose one of the updates.
pub struct ProductRegistry {
    path: PathBuf,
    products: Vec<Product>,
}

impl ProductRegistry {
    /// Load the registry at `path`; a missing file is an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let products = read_products(&path)?;
        debug!("Loaded {} products from {:?}", products.len(), path);
        Ok(Self { path, products })
    }

    /// Re-read the file, picking up edits made by other processes.
    pub fn reload(&mut self) -> Result<()> {
        self.products = read_products(&self.path)?;
        Ok(())
    }

    pub fn list_products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    /// Point `site` of product `name` at `url`, creating the product if needed.
    ///
    /// Blank names are rejected: they cannot be read back from the file.
    pub fn upsert(&mut self, name: &str, site: &str, url: &str) -> Result<Upsert> {
        if name.trim().is_empty() {
            bail!("product name must not be empty");
        }

        let outcome = match self.products.iter_mut().find(|p| p.name == name) {
            Some(product) => {
                product.set_url(site, url);
                Upsert::Updated
            }
            None => {
                self.products.push(Product::new(name).with_url(site, url));
                Upsert::Created
            }
        };

        self.save()?;
        info!("{:?} {} ({} -> {})", outcome, name, site, url);
        Ok(outcome)
    }

    pub fn save(&self) -> Result<()> {
        write_products(&self.path, &self.products)
    }
}

fn read_products(path: &Path) -> Result<Vec<Product>> {
    if !path.exists() {
        info!("No product registry at {:?}, starting empty", path);
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open product registry {:?}", path))?;

    let headers = reader.headers()?.clone();
    let name_idx = headers
        .iter()
        .position(|h| h == NAME_COLUMN)
        .with_context(|| format!("{:?} has no '{}' column", path, NAME_COLUMN))?;

    let mut products = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {} in {:?}: {}", i + 1, path, e);
                continue;
            }
        };

        let Some(name) = record.get(name_idx).filter(|n| !n.is_empty()) else {
            warn!("Row {} in {:?} has no product name", i + 1, path);
            continue;
        };

        let mut product = Product::new(name);
        for (column, cell) in headers.iter().zip(record.iter()) {
            if column != NAME_COLUMN && !cell.trim().is_empty() {
                product.set_url(column, cell.trim());
            }
        }
        products.push(product);
    }

    Ok(products)
}

/// Known sites first in site order, then any other site keys alphabetically.
fn site_columns(products: &[Product]) -> Vec<String> {
    let extra: BTreeSet<&str> = products
        .iter()
        .flat_map(|p| p.urls.keys())
        .map(String::as_str)
        .filter(|key| Site::from_key(key).is_none())
        .collect();

    Site::ALL
        .iter()
        .map(|site| site.key().to_string())
        .chain(extra.into_iter().map(str::to_string))
        .collect()
}

fn write_products(path: &Path, products: &[Product]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }

    let columns = site_columns(products);
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to write product registry {:?}", path))?;

    writer.write_record(std::iter::once(NAME_COLUMN).chain(columns.iter().map(String::as_str)))?;
    for product in products {
        let cells = columns.iter().map(|c| product.url(c).unwrap_or(""));
        writer.write_record(std::iter::once(product.name.as_str()).chain(cells))?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry(dir: &TempDir) -> ProductRegistry {
        ProductRegistry::open(dir.path().join("products.csv")).unwrap()
    }

    #[test]
    fn missing_file_is_empty_registry() {
        let dir = TempDir::new().unwrap();
        assert!(registry(&dir).list_products().is_empty());
    }

    #[test]
    fn upsert_creates_then_updates() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir);

        assert_eq!(reg.upsert("azul", "amazon", "https://example/a").unwrap(), Upsert::Created);
        assert_eq!(
            reg.upsert("azul", "feltrinelli", "https://example/f").unwrap(),
            Upsert::Updated
        );

        assert_eq!(reg.list_products().len(), 1);
        let azul = reg.find("azul").unwrap();
        assert_eq!(azul.url("amazon"), Some("https://example/a"));
        assert_eq!(azul.url("feltrinelli"), Some("https://example/f"));
    }

    #[test]
    fn blank_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir);

        assert!(reg.upsert("", "amazon", "https://example/a").is_err());
        assert!(reg.upsert("   ", "amazon", "https://example/a").is_err());

        assert!(reg.list_products().is_empty());
        assert!(registry(&dir).list_products().is_empty());
    }

    #[test]
    fn upsert_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir);
        reg.upsert("azul", "amazon", "https://example/a").unwrap();
        let once = reg.list_products().to_vec();
        reg.upsert("azul", "amazon", "https://example/a").unwrap();
        assert_eq!(reg.list_products(), once.as_slice());
    }

    #[test]
    fn upsert_leaves_other_sites_alone() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir);
        reg.upsert("azul", "amazon", "https://example/a").unwrap();
        reg.upsert("azul", "dungeondice", "https://example/d").unwrap();
        reg.upsert("azul", "amazon", "https://example/a2").unwrap();

        let azul = reg.find("azul").unwrap();
        assert_eq!(azul.url("amazon"), Some("https://example/a2"));
        assert_eq!(azul.url("dungeondice"), Some("https://example/d"));
    }

    #[test]
    fn names_match_exactly() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir);
        reg.upsert("azul", "amazon", "https://example/a").unwrap();
        reg.upsert("Azul", "amazon", "https://example/a").unwrap();
        reg.upsert("azul ", "amazon", "https://example/a").unwrap();
        assert_eq!(reg.list_products().len(), 3);
    }

    #[test]
    fn reload_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir);
        reg.upsert("wingspan", "amazon", "https://example/w-a").unwrap();
        reg.upsert("wingspan", "feltrinelli", "https://example/w-f").unwrap();
        reg.upsert("forbidden_city", "dungeondice", "https://example/fc").unwrap();
        reg.upsert("azul", "ebay", "https://example/ebay").unwrap();

        let reloaded = registry(&dir);
        assert_eq!(reloaded.list_products(), reg.list_products());
    }

    #[test]
    fn writes_site_columns_in_order() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir);
        reg.upsert("azul", "zulu", "https://example/z").unwrap();
        reg.upsert("azul", "ebay", "https://example/e").unwrap();

        let contents = std::fs::read_to_string(dir.path().join("products.csv")).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(header, "name,amazon,dungeondice,feltrinelli,ebay,zulu");
    }

    #[test]
    fn reads_sparse_registry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("products.csv");
        std::fs::write(
            &path,
            "name,amazon,dungeondice,feltrinelli\n\
             wingspan,https://example/a,,\n\
             azul,,,\n",
        )
        .unwrap();

        let reg = ProductRegistry::open(&path).unwrap();
        assert_eq!(reg.list_products().len(), 2);
        assert_eq!(reg.find("wingspan").unwrap().urls.len(), 1);
        assert!(reg.find("azul").unwrap().urls.is_empty());
    }
}
