// src/ingest/providers/reuters.rs
use async_trait::async_trait;

use crate::ingest::types::{NormalizedItem, SourceProvider, SourceTag};

/// Reuters retired its public RSS feeds. The adapter stays in the plan so the
/// toggle keeps its meaning, but it never issues a request and yields nothing.
/// Keyed Reuters access can be wired through a custom URL template instead.
pub struct ReutersProvider;

#[async_trait]
impl SourceProvider for ReutersProvider {
    async fn fetch_latest(&self) -> Vec<NormalizedItem> {
        tracing::debug!(provider = self.name(), "no public feed; skipping");
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "reuters"
    }

    fn tag(&self) -> SourceTag {
        SourceTag::Reuters
    }
}
