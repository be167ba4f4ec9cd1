//! One-shot aggregation from the command line.
//!
//! ```text
//! fetch_demo '{"keywords":["inflation"],"tickers":["SPY"],"maxItems":10}'
//! echo '{"keywords":["cpi"]}' | fetch_demo
//! ```

use anyhow::Context;
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pulse_news::ingest::config::AggregatorConfig;
use pulse_news::ingest::http::ReqwestFetch;
use pulse_news::{Aggregator, FetchRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pulse_news=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        }
    };
    let raw = if raw.trim().is_empty() { "{}" } else { raw.as_str() };
    let req: FetchRequest = serde_json::from_str(raw).context("parsing request json")?;

    let cfg = AggregatorConfig::load_default()?;
    let aggregator = Aggregator::new(cfg, Arc::new(ReqwestFetch::new()));
    let resp = aggregator.fetch_news(&req).await;

    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}
