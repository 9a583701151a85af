use crate::errors::FetchError;
use crate::shared_types::{ExchangeId, ExchangeQuote};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{info, warn};

pub mod edgex;
pub mod grvt;
pub mod hyperliquid;
pub mod lighter;
pub mod paradex;

/// Per-symbol output of a single adapter, keyed by bare base-asset ticker.
pub type QuoteMap = HashMap<String, ExchangeQuote>;

/// One exchange's API client. Implementations normalize symbols, convert
/// funding rates to the hourly basis and apply field fallbacks, so the rest
/// of the pipeline never sees exchange-specific shapes.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    fn id(&self) -> ExchangeId;

    async fn fetch(&self, client: &reqwest::Client) -> Result<QuoteMap, FetchError>;
}

/// All adapters in canonical order.
pub fn all_adapters(detail_concurrency: usize) -> Vec<Box<dyn ExchangeAdapter>> {
    vec![
        Box::new(hyperliquid::HyperliquidAdapter),
        Box::new(grvt::GrvtAdapter::new(detail_concurrency)),
        Box::new(edgex::EdgexAdapter::new(detail_concurrency)),
        Box::new(lighter::LighterAdapter),
        Box::new(paradex::ParadexAdapter),
    ]
}

/// Runs every adapter concurrently and collects results in canonical order.
/// A failing exchange degrades to an empty map; the cycle always completes.
pub async fn fetch_all(
    client: &reqwest::Client,
    detail_concurrency: usize,
) -> Vec<(ExchangeId, QuoteMap)> {
    let adapters = all_adapters(detail_concurrency);
    let fetches = adapters.iter().map(|adapter| async move {
        let id = adapter.id();
        match adapter.fetch(client).await {
            Ok(quotes) => {
                info!(exchange = %id, symbols = quotes.len(), "fetched exchange data");
                (id, quotes)
            }
            Err(e) => {
                warn!(exchange = %id, error = %e, "exchange fetch failed, continuing without it");
                (id, QuoteMap::new())
            }
        }
    });
    futures::future::join_all(fetches).await
}

/// Shared status check: non-2xx responses become typed errors instead of
/// being parsed as payloads.
pub(crate) fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(FetchError::HttpStatus(response.status()))
    }
}
