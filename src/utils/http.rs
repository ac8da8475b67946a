use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

use crate::config::HttpConfig;

pub fn create_client(config: &HttpConfig) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    Ok(client)
}

/// Source of product pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Body of the page at `url`, or an empty string when there is no URL.
    async fn fetch(&self, url: Option<&str>) -> Result<String>;
}

/// Single-attempt GET; the body is returned whatever the status code.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: Option<&str>) -> Result<String> {
        let Some(url) = url else {
            return Ok(String::new());
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed for {}", url))?;

        debug!("GET {} -> {}", url, response.status());

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }
}
