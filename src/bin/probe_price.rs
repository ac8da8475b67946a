//! Fetch one product page and show what a site's extraction rule finds.
//!
//! Usage: `probe_price <site> <url> [--save page.html]`

use anyhow::{bail, Context, Result};
use std::fs;

use price_tracker::config::HttpConfig;
use price_tracker::models::Site;
use price_tracker::scrapers::{extractor_for, PriceExtractor};
use price_tracker::utils::{create_client, HttpFetcher, PageFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (site_key, url) = match args.as_slice() {
        [site, url, ..] => (site.as_str(), url.as_str()),
        _ => bail!("usage: probe_price <site> <url> [--save page.html]"),
    };

    let site = Site::from_key(site_key).with_context(|| format!("unknown site '{}'", site_key))?;
    let extractor = extractor_for(site);

    let fetcher = HttpFetcher::new(create_client(&HttpConfig::default())?);
    println!("Fetching {} page {}...", site, url);
    let html = fetcher.fetch(Some(url)).await?;
    println!("Received {} bytes", html.len());

    if let [_, _, flag, path, ..] = args.as_slice() {
        if flag == "--save" {
            fs::write(path, &html)?;
            println!("Saved page to {}", path);
        }
    }

    println!("Rule: {:?}", extractor.rule());
    match extractor.try_extract(&html) {
        Ok(price) => println!("Price: {}", price),
        Err(e) => println!("No price: {}", e),
    }

    Ok(())
}
