use crate::adapters::{check_status, ExchangeAdapter, QuoteMap};
use crate::errors::FetchError;
use crate::normalization::{first_f64, to_hourly};
use crate::shared_types::{ExchangeId, ExchangeQuote};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

const INSTRUMENTS_URL: &str = "https://market-data.grvt.io/full/v1/instruments";
const TICKER_URL: &str = "https://market-data.grvt.io/full/v1/ticker";

/// GRVT quotes its funding rate on an 8-hour basis.
const NATIVE_PERIOD_HOURS: f64 = 8.0;

#[derive(Deserialize)]
struct InstrumentList {
    #[serde(default)]
    result: Vec<Instrument>,
}

#[derive(Deserialize)]
struct Instrument {
    instrument: String,
    base: Option<String>,
}

/// Outcome of one per-instrument ticker fetch. Failures are isolated per
/// task: a skipped instrument never aborts the adapter.
enum TickerFetch {
    Quote(String, ExchangeQuote),
    Skipped { instrument: String, reason: FetchError },
}

/// Two-phase adapter: enumerate active USDT perpetuals, then fetch one
/// ticker per instrument with a bounded fan-out.
pub struct GrvtAdapter {
    detail_concurrency: usize,
}

impl GrvtAdapter {
    pub fn new(detail_concurrency: usize) -> Self {
        GrvtAdapter { detail_concurrency }
    }
}

#[async_trait]
impl ExchangeAdapter for GrvtAdapter {
    fn id(&self) -> ExchangeId {
        ExchangeId::Grvt
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<QuoteMap, FetchError> {
        let response = client
            .post(INSTRUMENTS_URL)
            .json(&json!({
                "kind": ["PERPETUAL"],
                "quote": ["USDT"],
                "is_active": true,
                "limit": 500
            }))
            .send()
            .await?;
        let instruments: InstrumentList = check_status(response)?.json().await?;

        let fetches = instruments
            .result
            .into_iter()
            .map(|instrument| fetch_ticker(client, instrument));
        let outcomes: Vec<TickerFetch> = futures::stream::iter(fetches)
            .buffer_unordered(self.detail_concurrency.max(1))
            .collect()
            .await;

        let mut quotes = QuoteMap::new();
        for outcome in outcomes {
            match outcome {
                TickerFetch::Quote(symbol, quote) => {
                    quotes.insert(symbol, quote);
                }
                TickerFetch::Skipped { instrument, reason } => {
                    warn!(exchange = "grvt", %instrument, error = %reason, "skipping instrument");
                }
            }
        }
        Ok(quotes)
    }
}

async fn fetch_ticker(client: &reqwest::Client, instrument: Instrument) -> TickerFetch {
    match ticker_quote(client, &instrument.instrument).await {
        Ok(quote) => TickerFetch::Quote(base_symbol(&instrument), quote),
        Err(reason) => TickerFetch::Skipped {
            instrument: instrument.instrument,
            reason,
        },
    }
}

async fn ticker_quote(client: &reqwest::Client, instrument: &str) -> Result<ExchangeQuote, FetchError> {
    let response = client
        .post(TICKER_URL)
        .json(&json!({ "instrument": instrument }))
        .send()
        .await?;
    let payload: Value = check_status(response)?.json().await?;
    // Some API versions wrap the ticker under "result", others return it bare.
    let ticker = if payload["result"].is_object() {
        &payload["result"]
    } else {
        &payload
    };
    Ok(normalize_ticker(ticker))
}

fn normalize_ticker(ticker: &Value) -> ExchangeQuote {
    let funding_rate_8h = first_f64(ticker, &["funding_rate_8h_curr"]);
    // Volume comes split into buy and sell legs.
    let buy_volume = first_f64(ticker, &["buy_volume_24h_q"]);
    let sell_volume = first_f64(ticker, &["sell_volume_24h_q"]);
    ExchangeQuote {
        funding_rate: to_hourly(funding_rate_8h, NATIVE_PERIOD_HOURS),
        mark_price: first_f64(ticker, &["mark_price"]),
        volume_24h: buy_volume + sell_volume,
    }
}

fn base_symbol(instrument: &Instrument) -> String {
    match &instrument.base {
        Some(base) => base.clone(),
        None => instrument.instrument.replace("_USDT_Perp", ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_eight_hour_rate_and_sums_volume_legs() {
        let ticker = json!({
            "funding_rate_8h_curr": "0.0008",
            "mark_price": "65000.0",
            "buy_volume_24h_q": "1000.0",
            "sell_volume_24h_q": "500.0"
        });
        let quote = normalize_ticker(&ticker);
        assert_eq!(quote.funding_rate, 0.0001);
        assert_eq!(quote.mark_price, 65000.0);
        assert_eq!(quote.volume_24h, 1500.0);
    }

    #[test]
    fn absent_ticker_fields_default_to_zero() {
        let quote = normalize_ticker(&json!({}));
        assert_eq!(quote.funding_rate, 0.0);
        assert_eq!(quote.mark_price, 0.0);
        assert_eq!(quote.volume_24h, 0.0);
    }

    #[test]
    fn base_symbol_prefers_declared_base_over_name_stripping() {
        let with_base = Instrument {
            instrument: "BTC_USDT_Perp".to_string(),
            base: Some("BTC".to_string()),
        };
        assert_eq!(base_symbol(&with_base), "BTC");

        let without_base = Instrument {
            instrument: "ETH_USDT_Perp".to_string(),
            base: None,
        };
        assert_eq!(base_symbol(&without_base), "ETH");
    }
}
