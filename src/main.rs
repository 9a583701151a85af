use chrono::Utc;
use dotenv::dotenv;
use funding_compare::adapters::fetch_all;
use funding_compare::aggregator::merge;
use funding_compare::config::Config;
use funding_compare::snapshot_store::SnapshotStore;
use funding_compare::spread_engine::annotate;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let store = SnapshotStore::new(&config.snapshot_path);

    loop {
        if let Err(e) = run_cycle(&client, &store, &config).await {
            // A failed cycle (typically a snapshot write) is never fatal to
            // the periodic loop; the next scheduled run retries. Only a
            // single-shot invocation reports the failure to the caller.
            handle_cycle_error(e, config.fetch_interval)?;
        }
        match config.fetch_interval {
            Some(interval) => {
                info!(secs = interval.as_secs(), "sleeping until next cycle");
                sleep(interval).await;
            }
            None => break,
        }
    }
    Ok(())
}

fn handle_cycle_error(
    error: Box<dyn std::error::Error>,
    fetch_interval: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    match fetch_interval {
        Some(_) => {
            warn!(error = %error, "fetch cycle failed, retrying on the next scheduled run");
            Ok(())
        }
        None => Err(error),
    }
}

async fn run_cycle(
    client: &reqwest::Client,
    store: &SnapshotStore,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("starting funding rates fetch cycle");
    let quotes_by_exchange = fetch_all(client, config.detail_concurrency).await;

    let populated = quotes_by_exchange
        .iter()
        .filter(|(_, quotes)| !quotes.is_empty())
        .count();
    let mut records = merge(quotes_by_exchange);
    annotate(&mut records, config.main_exchange);

    // Surface the widest spreads before persisting; handy when tailing logs.
    let mut widest: Vec<_> = records
        .iter()
        .filter(|r| r.max_spread > 0.0)
        .map(|r| (r.symbol.as_str(), r.max_spread))
        .collect();
    widest.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (symbol, spread) in widest.iter().take(5) {
        info!(%symbol, spread = %format!("{:.4}%", spread * 100.0), "wide funding spread");
    }

    // The snapshot is only written after the full cycle; an abandoned cycle
    // never leaves a partial artifact behind.
    store.write(&records, Utc::now())?;
    info!(
        symbols = records.len(),
        exchanges_populated = populated,
        path = %store.path().display(),
        "snapshot written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use funding_compare::errors::StoreError;

    fn write_failure() -> Box<dyn std::error::Error> {
        Box::new(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }

    #[test]
    fn interval_mode_keeps_running_after_a_failed_cycle() {
        let result = handle_cycle_error(write_failure(), Some(Duration::from_secs(3600)));
        assert!(result.is_ok());
    }

    #[test]
    fn run_once_mode_reports_the_failed_cycle() {
        let result = handle_cycle_error(write_failure(), None);
        assert!(result.is_err());
    }
}
