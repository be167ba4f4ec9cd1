// src/ingest/mod.rs
pub mod config;
pub mod feed;
pub mod http;
pub mod locale;
pub mod providers;
pub mod request;
pub mod shapes;
pub mod types;

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::ingest::config::AggregatorConfig;
use crate::ingest::http::HttpFetch;
use crate::ingest::providers::{
    custom_url::CustomUrlProvider,
    google_news::GoogleNewsProvider,
    marketwatch::MarketWatchProvider,
    prnewswire::PrNewswireProvider,
    reddit::{RedditProvider, RedditSort},
    reuters::ReutersProvider,
    sec_edgar::SecEdgarProvider,
    yahoo_finance::YahooFinanceProvider,
};
use crate::ingest::request::FetchRequest;
use crate::ingest::types::{NormalizedItem, SourceProvider, SourceTag};

pub const SNIPPET_MAX_CHARS: usize = 300;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_requests_total", "Aggregation requests served.");
        describe_counter!(
            "news_items_fetched_total",
            "Items returned by providers before capping."
        );
        describe_counter!(
            "news_provider_errors_total",
            "Provider fetch/status/parse errors (absorbed)."
        );
        describe_counter!(
            "news_dedup_dropped_total",
            "Items removed by URL deduplication."
        );
        describe_counter!("news_feed_entries_total", "Entries parsed from RSS/Atom.");
        describe_histogram!("news_fetch_ms", "Provider fetch time in milliseconds.");
        describe_histogram!("news_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Plain-text excerpt: decode entities, strip tags, collapse whitespace, cap length.
pub fn normalize_snippet(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?s)<[^>]*>").unwrap());
    let stripped = re_tags.replace_all(&decoded, "");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    let collapsed = re_ws.replace_all(&stripped, " ");

    let out = collapsed.trim();
    if out.chars().count() > SNIPPET_MAX_CHARS {
        out.chars()
            .take(SNIPPET_MAX_CHARS)
            .collect::<String>()
            .trim_end()
            .to_string()
    } else {
        out.to_string()
    }
}

/// Group by source (in order of first appearance) and keep at most `max_items`
/// per group, preserving each group's relative order.
pub fn cap_per_source(items: Vec<NormalizedItem>, max_items: usize) -> Vec<NormalizedItem> {
    let mut order: Vec<SourceTag> = Vec::new();
    let mut groups: HashMap<SourceTag, Vec<NormalizedItem>> = HashMap::new();
    for it in items {
        let group = groups.entry(it.source).or_insert_with(|| {
            order.push(it.source);
            Vec::new()
        });
        if group.len() < max_items {
            group.push(it);
        }
    }
    order
        .into_iter()
        .flat_map(|tag| groups.remove(&tag).unwrap_or_default())
        .collect()
}

/// First occurrence of each URL wins; later duplicates are dropped untouched.
/// Returns (kept, dropped_count).
pub fn dedup_by_url(items: Vec<NormalizedItem>) -> (Vec<NormalizedItem>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut keep = Vec::with_capacity(items.len());
    let mut dropped = 0usize;
    for it in items {
        if seen.insert(it.url.clone()) {
            keep.push(it);
        } else {
            dropped += 1;
        }
    }
    (keep, dropped)
}

/// Newest first; ties keep their incoming order (stable sort).
pub fn sort_by_recency(items: &mut [NormalizedItem]) {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// cap → dedup → sort, in that order.
pub fn post_process(items: Vec<NormalizedItem>, max_items: usize) -> Vec<NormalizedItem> {
    let capped = cap_per_source(items, max_items);
    let (mut unique, dropped) = dedup_by_url(capped);
    counter!("news_dedup_dropped_total").increment(dropped as u64);
    sort_by_recency(&mut unique);
    unique
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub items: Vec<NormalizedItem>,
    pub total_count: usize,
    pub sources_queried: usize,
}

/// Plans adapter invocations for a request and runs them as one settle-all fan-out.
#[derive(Clone)]
pub struct Aggregator {
    cfg: Arc<AggregatorConfig>,
    http: Arc<dyn HttpFetch>,
}

impl Aggregator {
    pub fn new(cfg: AggregatorConfig, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            cfg: Arc::new(cfg),
            http,
        }
    }

    /// Invocations implied by the request's toggles and preconditions, in fixed order.
    pub fn plan(&self, req: &FetchRequest) -> Vec<Arc<dyn SourceProvider>> {
        let cfg = &self.cfg;
        let ep = &cfg.endpoints;
        let http = &self.http;
        let query = req.query();
        let has_query = !query.is_empty();
        let on = req.sources;

        let mut plan: Vec<Arc<dyn SourceProvider>> = Vec::new();

        if on.google_news && has_query {
            plan.push(Arc::new(GoogleNewsProvider::new(
                http.clone(),
                &ep.google_news,
                &query,
            )));
        }
        if on.reddit && has_query {
            for sort in [RedditSort::New, RedditSort::Relevance] {
                plan.push(Arc::new(RedditProvider::new(
                    http.clone(),
                    &ep.reddit,
                    &query,
                    &req.subreddits,
                    sort,
                    req.time_window,
                    req.max_items,
                    &cfg.browser_user_agent,
                )));
            }
        }
        if on.yahoo_finance && !req.tickers.is_empty() {
            plan.push(Arc::new(YahooFinanceProvider::new(
                http.clone(),
                &ep.yahoo_finance,
                &req.tickers,
            )));
        }
        if on.reuters && has_query {
            plan.push(Arc::new(ReutersProvider));
        }
        if on.market_watch {
            plan.push(Arc::new(MarketWatchProvider::new(
                http.clone(),
                &ep.marketwatch,
                &cfg.browser_user_agent,
            )));
        }
        if on.pr_newswire {
            plan.push(Arc::new(PrNewswireProvider::new(http.clone(), &ep.prnewswire)));
        }
        if on.sec_edgar {
            plan.push(Arc::new(SecEdgarProvider::new(
                http.clone(),
                &ep.sec_edgar,
                &cfg.sec_user_agent,
            )));
        }
        if has_query {
            for template in req.custom_urls.templates() {
                plan.push(Arc::new(CustomUrlProvider::new(
                    http.clone(),
                    &template,
                    &query,
                    &cfg.browser_user_agent,
                )));
            }
        }
        plan
    }

    /// Run every planned invocation concurrently and concatenate what succeeded,
    /// in plan order. A panicking or timed-out invocation contributes nothing.
    pub async fn run_all(&self, plan: &[Arc<dyn SourceProvider>]) -> Vec<NormalizedItem> {
        let timeout = self.cfg.adapter_timeout();

        let handles: Vec<_> = plan
            .iter()
            .map(|p| {
                let p = Arc::clone(p);
                tokio::spawn(async move {
                    match timeout {
                        Some(limit) => tokio::time::timeout(limit, p.fetch_latest()).await.ok(),
                        None => Some(p.fetch_latest().await),
                    }
                })
            })
            .collect();

        let mut combined = Vec::new();
        for (p, h) in plan.iter().zip(handles) {
            match h.await {
                Ok(Some(mut items)) => combined.append(&mut items),
                Ok(None) => {
                    tracing::warn!(provider = p.name(), source = %p.tag(), ?timeout, "provider timed out");
                    counter!("news_provider_errors_total", "provider" => p.name()).increment(1);
                }
                Err(e) => {
                    tracing::warn!(error = ?e, provider = p.name(), source = %p.tag(), "provider task failed");
                    counter!("news_provider_errors_total", "provider" => p.name()).increment(1);
                }
            }
        }
        combined
    }

    /// Full pipeline for one request: plan → fan-out → cap → dedup → sort.
    pub async fn fetch_news(&self, req: &FetchRequest) -> FetchResponse {
        ensure_metrics_described();
        counter!("news_requests_total").increment(1);

        let plan = self.plan(req);
        let raw = self.run_all(&plan).await;
        let fetched = raw.len();
        let items = post_process(raw, req.max_items);

        tracing::info!(
            target: "ingest",
            invocations = plan.len(),
            fetched,
            kept = items.len(),
            "aggregation finished"
        );

        FetchResponse {
            total_count: items.len(),
            sources_queried: plan.len(),
            items,
        }
    }
}
