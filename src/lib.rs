// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod ingest;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::ingest::request::{FetchRequest, SourceToggles, TimeWindow};
pub use crate::ingest::types::{NormalizedItem, SourceProvider, SourceTag};
pub use crate::ingest::{Aggregator, FetchResponse};
