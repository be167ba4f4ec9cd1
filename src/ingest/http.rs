// src/ingest/http.rs
//! Outbound HTTP seam. Adapters talk to the network only through `HttpFetch`,
//! so tests can swap in canned responses.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

/// Raw response as adapters see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail on non-2xx, otherwise hand back self.
    pub fn ensure_success(self) -> Result<Self> {
        if !self.is_success() {
            bail!("HTTP {}", self.status);
        }
        Ok(self)
    }
}

pub type Headers = Vec<(&'static str, String)>;

#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse>;
}

/// Production client backed by `reqwest`.
#[derive(Clone, Default)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse> {
        let mut req = self.client.get(url);
        for (name, value) in headers {
            req = req.header(*name, value.as_str());
        }
        let resp = req.send().await.with_context(|| format!("GET {url}"))?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
