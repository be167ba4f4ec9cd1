// src/ingest/shapes.rs
//! Known JSON response schemas.
//!
//! Each schema is a variant of [`KnownShape`] with a recogniser in [`RECOGNISERS`].
//! Supporting a new JSON source means adding a variant, its recogniser and its
//! mapping; the custom-URL adapter picks it up without further changes.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::normalize_snippet;
use crate::ingest::types::{Engagement, NormalizedItem, SourceTag};

pub const REDDIT_PERMALINK_BASE: &str = "https://reddit.com";

/// `{ data: { children: [ { data: Post } ] } }`
///
/// Children stay untyped until mapping so one malformed post (or a `kind: "more"`
/// stub with `data: null`) only costs itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedditListing {
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedditPost {
    pub title: Option<String>,
    pub permalink: Option<String>,
    pub url: Option<String>,
    pub created_utc: Option<f64>,
    pub selftext: Option<String>,
    pub author: Option<String>,
    pub score: Option<i64>,
    pub num_comments: Option<u64>,
}

impl RedditPost {
    fn resolved_url(&self) -> Option<String> {
        match self.permalink.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => Some(format!("{REDDIT_PERMALINK_BASE}{p}")),
            _ => self
                .url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        }
    }

    pub fn into_item(self, source: SourceTag, site: &str, now: DateTime<Utc>) -> Option<NormalizedItem> {
        let url = self.resolved_url()?;
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return None;
        }
        let engagement = if self.score.is_some() || self.num_comments.is_some() {
            Some(Engagement {
                score: self.score,
                comments: self.num_comments,
            })
        } else {
            None
        };
        Some(NormalizedItem {
            title: title.to_string(),
            url,
            published_at: self.created_utc.and_then(epoch_to_utc).unwrap_or(now),
            snippet: self
                .selftext
                .as_deref()
                .map(normalize_snippet)
                .unwrap_or_default(),
            source,
            site: site.to_string(),
            author: self.author.filter(|a| !a.is_empty()),
            engagement,
        })
    }
}

impl RedditListing {
    pub fn into_items(self, source: SourceTag, site: &str, now: DateTime<Utc>) -> Vec<NormalizedItem> {
        let total = self.data.children.len();
        let items: Vec<NormalizedItem> = self
            .data
            .children
            .into_iter()
            .filter_map(decode_post)
            .filter_map(|post| post.into_item(source, site, now))
            .collect();
        if items.len() < total {
            tracing::debug!(%source, kept = items.len(), total, "skipped unusable reddit children");
        }
        items
    }
}

fn decode_post(mut child: Value) -> Option<RedditPost> {
    let data = child.get_mut("data")?.take();
    serde_json::from_value(data).ok()
}

fn epoch_to_utc(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    Utc.timestamp_opt(whole, nanos).single()
}

/// Tagged union of recognised JSON payloads.
#[derive(Debug, Clone)]
pub enum KnownShape {
    RedditListing(RedditListing),
}

type Recogniser = fn(&Value) -> Option<KnownShape>;

/// Tried in order; first hit wins.
pub const RECOGNISERS: &[Recogniser] = &[recognise_reddit_listing];

fn recognise_reddit_listing(v: &Value) -> Option<KnownShape> {
    let children = v.get("data")?.get("children")?;
    if !children.is_array() {
        return None;
    }
    serde_json::from_value::<RedditListing>(v.clone())
        .ok()
        .map(KnownShape::RedditListing)
}

impl KnownShape {
    pub fn sniff(v: &Value) -> Option<KnownShape> {
        RECOGNISERS.iter().find_map(|recognise| recognise(v))
    }

    pub fn name(&self) -> &'static str {
        match self {
            KnownShape::RedditListing(_) => "reddit-listing",
        }
    }

    pub fn into_items(self, source: SourceTag, site: &str, now: DateTime<Utc>) -> Vec<NormalizedItem> {
        match self {
            KnownShape::RedditListing(l) => l.into_items(source, site, now),
        }
    }
}
