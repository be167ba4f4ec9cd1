// tests/common/mod.rs
//
// Shared test doubles: a canned-response HTTP transport that records every
// request, plus a config pointing all endpoints at fake hosts.
#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pulse_news::ingest::config::{AggregatorConfig, Endpoints};
use pulse_news::ingest::http::{Headers, HttpFetch, HttpResponse};
use pulse_news::ingest::Aggregator;

pub const GOOGLE_XML: &str = include_str!("../fixtures/google_news.xml");
pub const REDDIT_JSON: &str = include_str!("../fixtures/reddit_listing.json");
pub const MARKETWATCH_XML: &str = include_str!("../fixtures/marketwatch.xml");
pub const PRNEWSWIRE_XML: &str = include_str!("../fixtures/prnewswire.xml");
pub const SEC_XML: &str = include_str!("../fixtures/sec_edgar.xml");
pub const YAHOO_XML: &str = include_str!("../fixtures/yahoo_finance.xml");

pub const RSS: &str = "application/rss+xml; charset=utf-8";
pub const ATOM: &str = "application/atom+xml";
pub const JSON: &str = "application/json; charset=utf-8";

pub const TEST_BROWSER_UA: &str = "pulse-news-test/1.0";
pub const TEST_SEC_UA: &str = "pulse-news tests ops@example.test";

#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub headers: Headers,
}

impl Call {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    prefix: String,
    response: HttpResponse,
    delay: Option<Duration>,
}

/// Routes by URL prefix (first match wins). Unrouted URLs fail like a refused connection.
#[derive(Default)]
pub struct FakeHttp {
    routes: Vec<Route>,
    calls: Mutex<Vec<Call>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, prefix: &str, status: u16, content_type: &str, body: &str) -> Self {
        self.routes.push(Route {
            prefix: prefix.to_string(),
            response: HttpResponse {
                status,
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
            delay: None,
        });
        self
    }

    pub fn slow_route(mut self, prefix: &str, delay: Duration, content_type: &str, body: &str) -> Self {
        self = self.route(prefix, 200, content_type, body);
        if let Some(last) = self.routes.last_mut() {
            last.delay = Some(delay);
        }
        self
    }

    /// Every fixture under the hosts of [`test_config`].
    pub fn with_all_fixtures() -> Self {
        Self::new()
            .route("http://news.test/", 200, RSS, GOOGLE_XML)
            .route("http://reddit.test/", 200, JSON, REDDIT_JSON)
            .route("http://yahoo.test/", 200, RSS, YAHOO_XML)
            .route("http://mw.test/", 200, RSS, MARKETWATCH_XML)
            .route("http://prn.test/", 200, RSS, PRNEWSWIRE_XML)
            .route("http://sec.test/", 200, ATOM, SEC_XML)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }

    pub fn calls_to(&self, prefix: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.url.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl HttpFetch for FakeHttp {
    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            headers: headers.clone(),
        });
        let Some(route) = self.routes.iter().find(|r| url.starts_with(&r.prefix)) else {
            bail!("connection refused: {url}");
        };
        if let Some(d) = route.delay {
            tokio::time::sleep(d).await;
        }
        Ok(route.response.clone())
    }
}

pub fn test_config() -> AggregatorConfig {
    AggregatorConfig {
        browser_user_agent: TEST_BROWSER_UA.to_string(),
        sec_user_agent: TEST_SEC_UA.to_string(),
        adapter_timeout_ms: None,
        endpoints: Endpoints {
            google_news: "http://news.test".to_string(),
            reddit: "http://reddit.test".to_string(),
            yahoo_finance: "http://yahoo.test".to_string(),
            marketwatch: "http://mw.test/rss/topstories".to_string(),
            prnewswire: "http://prn.test/rss/news-releases-list.rss".to_string(),
            sec_edgar: "http://sec.test/cgi-bin/browse-edgar?action=getcurrent&output=atom".to_string(),
        },
    }
}

pub fn aggregator(fake: &Arc<FakeHttp>) -> Aggregator {
    Aggregator::new(test_config(), fake.clone())
}
