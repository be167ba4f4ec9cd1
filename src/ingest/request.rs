// src/ingest/request.rs
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}
fn default_max_items() -> usize {
    50
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "all")]
    All,
}

impl TimeWindow {
    /// Reddit's `t=` parameter.
    pub fn as_reddit_param(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::All => "all",
        }
    }
}

/// Which built-in sources are enabled. Built once per request, never mutated after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceToggles {
    #[serde(default = "default_true")]
    pub google_news: bool,
    #[serde(default = "default_true")]
    pub reddit: bool,
    #[serde(default = "default_true")]
    pub yahoo_finance: bool,
    #[serde(default = "default_true")]
    pub reuters: bool,
    #[serde(default = "default_true")]
    pub market_watch: bool,
    #[serde(default = "default_true")]
    pub pr_newswire: bool,
    #[serde(default = "default_true")]
    pub sec_edgar: bool,
}

impl Default for SourceToggles {
    fn default() -> Self {
        Self::all(true)
    }
}

impl SourceToggles {
    pub fn all(on: bool) -> Self {
        Self {
            google_news: on,
            reddit: on,
            yahoo_finance: on,
            reuters: on,
            market_watch: on,
            pr_newswire: on,
            sec_edgar: on,
        }
    }
}

/// `customUrls` arrives either as one newline-delimited string or as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomUrls {
    Text(String),
    List(Vec<String>),
}

impl Default for CustomUrls {
    fn default() -> Self {
        CustomUrls::List(Vec::new())
    }
}

impl CustomUrls {
    /// Trimmed, non-blank templates in input order.
    pub fn templates(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            CustomUrls::Text(s) => s.split('\n').collect(),
            CustomUrls::List(v) => v.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub subreddits: Vec<String>,
    #[serde(default)]
    pub time_window: TimeWindow,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub sources: SourceToggles,
    #[serde(default)]
    pub custom_urls: CustomUrls,
}

// Matches an empty JSON body.
impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            tickers: Vec::new(),
            subreddits: Vec::new(),
            time_window: TimeWindow::default(),
            max_items: default_max_items(),
            sources: SourceToggles::default(),
            custom_urls: CustomUrls::default(),
        }
    }
}

impl FetchRequest {
    /// Keywords followed by `$TICKER` terms, space-joined.
    pub fn query(&self) -> String {
        self.keywords
            .iter()
            .cloned()
            .chain(self.tickers.iter().map(|t| format!("${t}")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
