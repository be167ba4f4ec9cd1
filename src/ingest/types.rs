// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed tag identifying which adapter produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    #[serde(rename = "google-news")]
    GoogleNews,
    #[serde(rename = "reddit")]
    Reddit,
    #[serde(rename = "yahoo-finance")]
    YahooFinance,
    #[serde(rename = "reuters")]
    Reuters,
    #[serde(rename = "marketwatch")]
    MarketWatch,
    #[serde(rename = "prnewswire")]
    PrNewswire,
    #[serde(rename = "sec-edgar")]
    SecEdgar,
    #[serde(rename = "custom")]
    Custom,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::GoogleNews => "google-news",
            SourceTag::Reddit => "reddit",
            SourceTag::YahooFinance => "yahoo-finance",
            SourceTag::Reuters => "reuters",
            SourceTag::MarketWatch => "marketwatch",
            SourceTag::PrNewswire => "prnewswire",
            SourceTag::SecEdgar => "sec-edgar",
            SourceTag::Custom => "custom",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Social engagement counters (only Reddit-shaped sources fill these).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Engagement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub title: String,
    pub url: String, // dedup key
    pub published_at: DateTime<Utc>,
    pub snippet: String, // <= SNIPPET_MAX_CHARS, markup stripped
    pub source: SourceTag,
    pub site: String, // hostname, e.g. "reddit.com"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
}

/// Feed entry before the caller stamps `source` and `site`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub snippet: String,
    pub author: Option<String>,
}

impl FeedEntry {
    pub fn into_item(self, source: SourceTag, site: &str) -> NormalizedItem {
        NormalizedItem {
            title: self.title,
            url: self.url,
            published_at: self.published_at,
            snippet: self.snippet,
            source,
            site: site.to_string(),
            author: self.author,
            engagement: None,
        }
    }
}

/// One adapter invocation. `fetch_latest` cannot fail: adapters absorb their own
/// network, status and parse errors and hand back an empty list instead.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Vec<NormalizedItem>;
    fn name(&self) -> &'static str;
    fn tag(&self) -> SourceTag;
}
