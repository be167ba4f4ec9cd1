//! pulse-news service entrypoint.
//! Boots the Axum HTTP server with the aggregator, metrics and CORS wired in.

use shuttle_axum::ShuttleAxum;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pulse_news::api::{self, AppState};
use pulse_news::ingest::config::AggregatorConfig;
use pulse_news::ingest::http::ReqwestFetch;
use pulse_news::ingest::Aggregator;
use pulse_news::metrics::Metrics;

const DEFAULT_LOG_FILTER: &str = "pulse_news=info,ingest=info,warn";

/// Local log output. `NEWS_DEV_LOG=1` turns it on (compact lines);
/// `NEWS_LOG_FORMAT=json` turns it on as JSON, which is handy when piping
/// per-provider warnings into `jq`. Otherwise the Shuttle runtime's own
/// subscriber stays in charge.
fn init_local_tracing() {
    let format = std::env::var("NEWS_LOG_FORMAT")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let dev_flag = std::env::var("NEWS_DEV_LOG").is_ok_and(|v| v == "1");
    if !dev_flag && format.is_empty() {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    // the runtime may already own the global subscriber
    let installed = if format == "json" {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already set; keeping it");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_local_tracing();

    let cfg = AggregatorConfig::load_default()?;
    tracing::info!(
        timeout_ms = ?cfg.adapter_timeout_ms,
        "aggregator config loaded"
    );

    let aggregator = Aggregator::new(cfg, Arc::new(ReqwestFetch::new()));
    let mut router = api::router(AppState::new(aggregator));

    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
