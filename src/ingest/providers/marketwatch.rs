// src/ingest/providers/marketwatch.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

use super::{absorb, fetch_body};
use crate::ingest::feed::parse_feed_with_creator;
use crate::ingest::http::HttpFetch;
use crate::ingest::types::{NormalizedItem, SourceProvider, SourceTag};

pub const SITE: &str = "marketwatch.com";

/// MarketWatch top stories. The feed credits authors via `dc:creator`.
pub struct MarketWatchProvider {
    http: Arc<dyn HttpFetch>,
    url: String,
    user_agent: String,
}

impl MarketWatchProvider {
    pub fn new(http: Arc<dyn HttpFetch>, url: &str, user_agent: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    async fn try_fetch(&self) -> Result<Vec<NormalizedItem>> {
        let now = Utc::now();
        let headers = vec![("User-Agent", self.user_agent.clone())];
        let xml = fetch_body(self.http.as_ref(), &self.url, &headers).await?;
        let items: Vec<NormalizedItem> = parse_feed_with_creator(&xml, now)
            .into_iter()
            .map(|e| e.into_item(SourceTag::MarketWatch, SITE))
            .collect();
        tracing::info!(target: "ingest", provider = "marketwatch", items = items.len(), "fetched");
        Ok(items)
    }
}

#[async_trait]
impl SourceProvider for MarketWatchProvider {
    async fn fetch_latest(&self) -> Vec<NormalizedItem> {
        let t0 = Instant::now();
        absorb(self.name(), t0, self.try_fetch().await)
    }

    fn name(&self) -> &'static str {
        "marketwatch"
    }

    fn tag(&self) -> SourceTag {
        SourceTag::MarketWatch
    }
}
