// src/ingest/providers/reddit.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

use super::{absorb, encode, fetch_body};
use crate::ingest::http::{Headers, HttpFetch};
use crate::ingest::request::TimeWindow;
use crate::ingest::shapes::RedditListing;
use crate::ingest::types::{NormalizedItem, SourceProvider, SourceTag};

pub const SITE: &str = "reddit.com";
/// Reddit rejects `limit` above this.
pub const REDDIT_MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedditSort {
    New,
    Relevance,
}

impl RedditSort {
    pub fn as_param(&self) -> &'static str {
        match self {
            RedditSort::New => "new",
            RedditSort::Relevance => "relevance",
        }
    }
}

/// Reddit JSON search, site-wide or restricted to a `+`-joined set of subreddits.
pub struct RedditProvider {
    http: Arc<dyn HttpFetch>,
    base: String,
    query: String,
    subreddits: Vec<String>,
    sort: RedditSort,
    window: TimeWindow,
    limit: usize,
    user_agent: String,
}

impl RedditProvider {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        http: Arc<dyn HttpFetch>,
        base: &str,
        query: &str,
        subreddits: &[String],
        sort: RedditSort,
        window: TimeWindow,
        max_items: usize,
        user_agent: &str,
    ) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            query: query.to_string(),
            subreddits: subreddits
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            sort,
            window,
            limit: max_items.min(REDDIT_MAX_LIMIT),
            user_agent: user_agent.to_string(),
        }
    }

    pub fn search_url(&self) -> String {
        let q = encode(&self.query);
        let sort = self.sort.as_param();
        let t = self.window.as_reddit_param();
        let limit = self.limit;
        if self.subreddits.is_empty() {
            format!("{}/search.json?q={q}&sort={sort}&t={t}&limit={limit}", self.base)
        } else {
            format!(
                "{}/r/{}/search.json?q={q}&restrict_sr=1&sort={sort}&t={t}&limit={limit}",
                self.base,
                self.subreddits.join("+")
            )
        }
    }

    fn headers(&self) -> Headers {
        vec![
            ("User-Agent", self.user_agent.clone()),
            ("Accept", "application/json".to_string()),
            ("Accept-Language", "en-US,en;q=0.9".to_string()),
        ]
    }

    async fn try_fetch(&self) -> Result<Vec<NormalizedItem>> {
        let now = Utc::now();
        let body = fetch_body(self.http.as_ref(), &self.search_url(), &self.headers()).await?;
        let listing: RedditListing =
            serde_json::from_str(&body).context("parsing reddit listing json")?;
        Ok(listing.into_items(SourceTag::Reddit, SITE, now))
    }
}

#[async_trait]
impl SourceProvider for RedditProvider {
    async fn fetch_latest(&self) -> Vec<NormalizedItem> {
        let t0 = Instant::now();
        absorb(self.name(), t0, self.try_fetch().await)
    }

    fn name(&self) -> &'static str {
        match self.sort {
            RedditSort::New => "reddit(new)",
            RedditSort::Relevance => "reddit(relevance)",
        }
    }

    fn tag(&self) -> SourceTag {
        SourceTag::Reddit
    }
}
