use crate::shared_types::ExchangeId;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SNAPSHOT_PATH: &str = "data/funding-rates.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DETAIL_CONCURRENCY: usize = 8;

/// Runtime settings, read from the environment (a `.env` file is honored via
/// dotenv in the binaries).
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the snapshot artifact is written.
    pub snapshot_path: PathBuf,
    /// Main exchange used when logging spreads after a cycle; readers pick
    /// their own at display time.
    pub main_exchange: ExchangeId,
    /// Per-request timeout. A timed-out exchange counts as a failed fetch.
    pub request_timeout: Duration,
    /// Bound on concurrent per-contract detail requests within the two-phase
    /// adapters.
    pub detail_concurrency: usize,
    /// Seconds between fetch cycles; `None` runs a single cycle and exits,
    /// matching a cron-driven deployment.
    pub fetch_interval: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let snapshot_path = env::var("SNAPSHOT_PATH")
            .unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string())
            .into();

        let main_exchange = match env::var("MAIN_EXCHANGE") {
            Ok(value) => value.parse::<ExchangeId>()?,
            Err(_) => ExchangeId::Hyperliquid,
        };

        let request_timeout = Duration::from_secs(parse_var(
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        let detail_concurrency =
            parse_var("DETAIL_CONCURRENCY", DEFAULT_DETAIL_CONCURRENCY)?;

        let fetch_interval = match parse_var("FETCH_INTERVAL_SECS", 0u64)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Config {
            snapshot_path,
            main_exchange,
            request_timeout,
            detail_concurrency,
            fetch_interval,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| format!("invalid {}: {}", name, value)),
        Err(_) => Ok(default),
    }
}
