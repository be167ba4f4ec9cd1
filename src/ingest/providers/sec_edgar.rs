// src/ingest/providers/sec_edgar.rs
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::{absorb, fetch_body};
use crate::ingest::feed::parse_feed;
use crate::ingest::http::HttpFetch;
use crate::ingest::types::{NormalizedItem, SourceProvider, SourceTag};

pub const SITE: &str = "sec.gov";

/// EDGAR "current filings" Atom feed (8-K by default, see config). EDGAR refuses
/// anonymous clients, so the configured identifying User-Agent is always sent.
pub struct SecEdgarProvider {
    http: Arc<dyn HttpFetch>,
    url: String,
    user_agent: String,
}

impl SecEdgarProvider {
    pub fn new(http: Arc<dyn HttpFetch>, url: &str, user_agent: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    async fn try_fetch(&self) -> Result<Vec<NormalizedItem>> {
        let headers = vec![("User-Agent", self.user_agent.clone())];
        let xml = fetch_body(self.http.as_ref(), &self.url, &headers).await?;
        Ok(parse_feed(&xml)
            .into_iter()
            .map(|e| e.into_item(SourceTag::SecEdgar, SITE))
            .collect())
    }
}

#[async_trait]
impl SourceProvider for SecEdgarProvider {
    async fn fetch_latest(&self) -> Vec<NormalizedItem> {
        let t0 = Instant::now();
        absorb(self.name(), t0, self.try_fetch().await)
    }

    fn name(&self) -> &'static str {
        "sec-edgar"
    }

    fn tag(&self) -> SourceTag {
        SourceTag::SecEdgar
    }
}
