// src/ingest/providers/google_news.rs
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::{absorb, encode, fetch_body};
use crate::ingest::feed::parse_feed;
use crate::ingest::http::HttpFetch;
use crate::ingest::locale::detect_locale;
use crate::ingest::types::{NormalizedItem, SourceProvider, SourceTag};

pub const SITE: &str = "news.google.com";

/// Google News RSS search, localized by the script of the query.
pub struct GoogleNewsProvider {
    http: Arc<dyn HttpFetch>,
    base: String,
    query: String,
}

impl GoogleNewsProvider {
    pub fn new(http: Arc<dyn HttpFetch>, base: &str, query: &str) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            query: query.to_string(),
        }
    }

    pub fn search_url(&self) -> String {
        let loc = detect_locale(&self.query);
        format!(
            "{}/rss/search?q={}&hl={}&gl={}&ceid={}",
            self.base,
            encode(&self.query),
            loc.hl,
            loc.gl,
            loc.ceid
        )
    }

    async fn try_fetch(&self) -> Result<Vec<NormalizedItem>> {
        let xml = fetch_body(self.http.as_ref(), &self.search_url(), &Vec::new()).await?;
        Ok(parse_feed(&xml)
            .into_iter()
            .map(|e| e.into_item(SourceTag::GoogleNews, SITE))
            .collect())
    }
}

#[async_trait]
impl SourceProvider for GoogleNewsProvider {
    async fn fetch_latest(&self) -> Vec<NormalizedItem> {
        let t0 = Instant::now();
        absorb(self.name(), t0, self.try_fetch().await)
    }

    fn name(&self) -> &'static str {
        "google-news"
    }

    fn tag(&self) -> SourceTag {
        SourceTag::GoogleNews
    }
}
