use crate::adapters::{check_status, ExchangeAdapter, QuoteMap};
use crate::errors::FetchError;
use crate::normalization::{base_from_delimited, first_f64, first_str};
use crate::shared_types::{ExchangeId, ExchangeQuote};
use async_trait::async_trait;
use serde_json::Value;

const SUMMARY_URL: &str = "https://api.prod.paradex.trade/v1/markets/summary";

const SYMBOL_KEYS: &[&str] = &["symbol", "market"];
const RATE_KEYS: &[&str] = &["funding_rate", "fundingRate"];
const PRICE_KEYS: &[&str] = &["mark_price", "markPrice"];
const VOLUME_KEYS: &[&str] = &["volume_24h", "quote_volume", "volume"];

/// Single-call adapter over the all-markets summary endpoint. Symbols are
/// dash-delimited (`BTC-USD-PERP`); rates are already hourly.
pub struct ParadexAdapter;

#[async_trait]
impl ExchangeAdapter for ParadexAdapter {
    fn id(&self) -> ExchangeId {
        ExchangeId::Paradex
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<QuoteMap, FetchError> {
        let response = client
            .get(SUMMARY_URL)
            .query(&[("market", "ALL")])
            .send()
            .await?;
        let payload: Value = check_status(response)?.json().await?;
        normalize(&payload)
    }
}

fn normalize(payload: &Value) -> Result<QuoteMap, FetchError> {
    let markets = payload["results"]
        .as_array()
        .or_else(|| payload.as_array())
        .ok_or_else(|| FetchError::Parse("no market array in payload".to_string()))?;

    let mut quotes = QuoteMap::new();
    for market in markets {
        let symbol = match first_str(market, SYMBOL_KEYS) {
            Some(symbol) => symbol,
            None => continue,
        };
        quotes.insert(
            base_from_delimited(symbol),
            ExchangeQuote {
                funding_rate: first_f64(market, RATE_KEYS),
                mark_price: first_f64(market, PRICE_KEYS),
                volume_24h: first_f64(market, VOLUME_KEYS),
            },
        );
    }
    Ok(quotes)
}
