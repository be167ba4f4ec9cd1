// src/ingest/providers/yahoo_finance.rs
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::{absorb, encode, fetch_body};
use crate::ingest::feed::parse_feed;
use crate::ingest::http::HttpFetch;
use crate::ingest::types::{NormalizedItem, SourceProvider, SourceTag};

pub const SITE: &str = "finance.yahoo.com";

/// Yahoo Finance headline feed for a set of tickers.
pub struct YahooFinanceProvider {
    http: Arc<dyn HttpFetch>,
    base: String,
    tickers: Vec<String>,
}

impl YahooFinanceProvider {
    pub fn new(http: Arc<dyn HttpFetch>, base: &str, tickers: &[String]) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            tickers: tickers.to_vec(),
        }
    }

    pub fn headline_url(&self) -> String {
        let symbols = self
            .tickers
            .iter()
            .map(|t| encode(t))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/rss/2.0/headline?s={symbols}&region=US&lang=en-US",
            self.base
        )
    }

    async fn try_fetch(&self) -> Result<Vec<NormalizedItem>> {
        // no symbols, no request
        if self.tickers.is_empty() {
            return Ok(Vec::new());
        }
        let xml = fetch_body(self.http.as_ref(), &self.headline_url(), &Vec::new()).await?;
        Ok(parse_feed(&xml)
            .into_iter()
            .map(|e| e.into_item(SourceTag::YahooFinance, SITE))
            .collect())
    }
}

#[async_trait]
impl SourceProvider for YahooFinanceProvider {
    async fn fetch_latest(&self) -> Vec<NormalizedItem> {
        let t0 = Instant::now();
        absorb(self.name(), t0, self.try_fetch().await)
    }

    fn name(&self) -> &'static str {
        "yahoo-finance"
    }

    fn tag(&self) -> SourceTag {
        SourceTag::YahooFinance
    }
}
