//! # Feed Fetcher
//!
//! Downloads feeds over HTTP with `reqwest` and hands the body to the parser.

use crate::domain::traits::FeedSource;
use crate::domain::types::FeedSnapshot;
use crate::infrastructure::feed_parser::parse_feed;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = concat!("mi-bot/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<FeedSnapshot> {
        tracing::debug!("Downloading feed {}", url);
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Feed {url} returned an error status"))?
            .text()
            .await
            .with_context(|| format!("Failed to read body of {url}"))?;

        parse_feed(&body).with_context(|| format!("Failed to parse feed {url}"))
    }
}
