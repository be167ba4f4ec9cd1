// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/aggregator.toml";
pub const DEFAULT_JSON_PATH: &str = "config/aggregator.json";

pub const DEFAULT_BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_SEC_UA: &str = "pulse-news contact@example.com";

/// Upstream locations. Base URLs for the search-style sources, full URLs for fixed feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub google_news: String,
    pub reddit: String,
    pub yahoo_finance: String,
    pub marketwatch: String,
    pub prnewswire: String,
    pub sec_edgar: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            google_news: "https://news.google.com".to_string(),
            reddit: "https://www.reddit.com".to_string(),
            yahoo_finance: "https://feeds.finance.yahoo.com".to_string(),
            marketwatch: "https://feeds.content.dowjones.io/public/rss/mw_topstories".to_string(),
            prnewswire: "https://www.prnewswire.com/rss/news-releases-list.rss".to_string(),
            sec_edgar: "https://www.sec.gov/cgi-bin/browse-edgar?action=getcurrent&type=8-K&company=&dateb=&owner=include&start=0&count=40&output=atom".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Sent to Reddit, MarketWatch and custom endpoints.
    pub browser_user_agent: String,
    /// SEC asks automated clients to identify themselves.
    pub sec_user_agent: String,
    /// Upper bound per adapter invocation. Unset = wait as long as the upstream takes.
    pub adapter_timeout_ms: Option<u64>,
    pub endpoints: Endpoints,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            browser_user_agent: DEFAULT_BROWSER_UA.to_string(),
            sec_user_agent: DEFAULT_SEC_UA.to_string(),
            adapter_timeout_ms: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl AggregatorConfig {
    pub fn adapter_timeout(&self) -> Option<Duration> {
        self.adapter_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading aggregator config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
    }

    /// Load using env var + fallbacks:
    /// 1) $NEWS_CONFIG_PATH
    /// 2) config/aggregator.toml
    /// 3) config/aggregator.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_JSON_PATH);
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AggregatorConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing aggregator config json");
    }
    match toml::from_str::<AggregatorConfig>(s) {
        Ok(cfg) => Ok(cfg),
        // no or unknown extension: give JSON a chance before giving up
        Err(toml_err) if hint_ext != "toml" => serde_json::from_str(s)
            .map_err(|_| anyhow!("unsupported aggregator config format: {toml_err}")),
        Err(e) => Err(e).context("parsing aggregator config toml"),
    }
}
