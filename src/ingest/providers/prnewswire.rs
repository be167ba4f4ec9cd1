// src/ingest/providers/prnewswire.rs
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::{absorb, fetch_body};
use crate::ingest::feed::parse_feed;
use crate::ingest::http::HttpFetch;
use crate::ingest::types::{NormalizedItem, SourceProvider, SourceTag};

pub const SITE: &str = "prnewswire.com";

pub struct PrNewswireProvider {
    http: Arc<dyn HttpFetch>,
    url: String,
}

impl PrNewswireProvider {
    pub fn new(http: Arc<dyn HttpFetch>, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }

    async fn try_fetch(&self) -> Result<Vec<NormalizedItem>> {
        let xml = fetch_body(self.http.as_ref(), &self.url, &Vec::new()).await?;
        Ok(parse_feed(&xml)
            .into_iter()
            .map(|e| e.into_item(SourceTag::PrNewswire, SITE))
            .collect())
    }
}

#[async_trait]
impl SourceProvider for PrNewswireProvider {
    async fn fetch_latest(&self) -> Vec<NormalizedItem> {
        let t0 = Instant::now();
        absorb(self.name(), t0, self.try_fetch().await)
    }

    fn name(&self) -> &'static str {
        "prnewswire"
    }

    fn tag(&self) -> SourceTag {
        SourceTag::PrNewswire
    }
}
