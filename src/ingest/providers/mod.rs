// src/ingest/providers/mod.rs
//! Source adapters. Each one owns its request shape and response mapping and turns
//! every failure into an empty result via [`absorb`].

pub mod custom_url;
pub mod google_news;
pub mod marketwatch;
pub mod prnewswire;
pub mod reddit;
pub mod reuters;
pub mod sec_edgar;
pub mod yahoo_finance;

use anyhow::Result;
use metrics::{counter, histogram};
use std::time::Instant;

use crate::ingest::http::{Headers, HttpFetch};
use crate::ingest::types::NormalizedItem;

/// Percent-encode a query component.
pub(crate) fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// GET and require a 2xx status; hands back the body.
pub(crate) async fn fetch_body(http: &dyn HttpFetch, url: &str, headers: &Headers) -> Result<String> {
    let resp = http.get(url, headers).await?.ensure_success()?;
    Ok(resp.body)
}

/// Collapse an adapter outcome into items: errors are logged, counted and dropped.
pub(crate) fn absorb(
    provider: &'static str,
    started: Instant,
    res: Result<Vec<NormalizedItem>>,
) -> Vec<NormalizedItem> {
    let ms = started.elapsed().as_secs_f64() * 1_000.0;
    histogram!("news_fetch_ms", "provider" => provider).record(ms);
    match res {
        Ok(items) => {
            counter!("news_items_fetched_total", "provider" => provider)
                .increment(items.len() as u64);
            tracing::debug!(provider, items = items.len(), ms, "provider fetched");
            items
        }
        Err(e) => {
            tracing::warn!(error = ?e, provider, "provider error");
            counter!("news_provider_errors_total", "provider" => provider).increment(1);
            Vec::new()
        }
    }
}
