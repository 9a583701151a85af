use crate::adapters::{check_status, ExchangeAdapter, QuoteMap};
use crate::errors::FetchError;
use crate::normalization::{base_from_delimited, first_f64, first_str};
use crate::shared_types::{ExchangeId, ExchangeQuote};
use async_trait::async_trait;
use serde_json::Value;

const FUNDING_URL: &str = "https://mainnet.zklighter.elliot.ai/api/v1/funding-rates";

// Candidate field names per concept, tried in priority order. The API has
// renamed these across versions.
const SYMBOL_KEYS: &[&str] = &["symbol", "market", "pair", "orderBookId", "order_book_id"];
const RATE_KEYS: &[&str] = &["funding_rate", "fundingRate", "rate"];
const PRICE_KEYS: &[&str] = &["mark_price", "markPrice", "price"];
const VOLUME_KEYS: &[&str] = &["volume_24h", "volume", "quote_volume"];

/// Single-call adapter. The funding-rates payload is either a bare array or
/// an object wrapping one. Rates are already hourly.
pub struct LighterAdapter;

#[async_trait]
impl ExchangeAdapter for LighterAdapter {
    fn id(&self) -> ExchangeId {
        ExchangeId::Lighter
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<QuoteMap, FetchError> {
        let response = client.get(FUNDING_URL).send().await?;
        let payload: Value = check_status(response)?.json().await?;
        normalize(&payload)
    }
}

fn normalize(payload: &Value) -> Result<QuoteMap, FetchError> {
    let entries = unwrap_entries(payload)
        .ok_or_else(|| FetchError::Parse("no funding-rate array in payload".to_string()))?;

    let mut quotes = QuoteMap::new();
    for item in entries {
        let symbol = match first_str(item, SYMBOL_KEYS) {
            Some(symbol) => symbol,
            None => continue,
        };
        quotes.insert(
            base_from_delimited(symbol),
            ExchangeQuote {
                funding_rate: first_f64(item, RATE_KEYS),
                mark_price: first_f64(item, PRICE_KEYS),
                volume_24h: first_f64(item, VOLUME_KEYS),
            },
        );
    }
    Ok(quotes)
}

fn unwrap_entries(payload: &Value) -> Option<&Vec<Value>> {
    if let Some(entries) = payload.as_array() {
        return Some(entries);
    }
    ["data", "results", "funding_rates"]
        .iter()
        .filter_map(|key| payload[*key].as_array())
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_bare_array_payload() {
        let payload = json!([
            {"symbol": "BTC_USDC_PERP", "funding_rate": "0.0001", "mark_price": 65000.0, "volume_24h": 100.0}
        ]);
        let quotes = normalize(&payload).unwrap();
        assert_eq!(quotes["BTC"].funding_rate, 0.0001);
    }

    #[test]
    fn accepts_wrapped_array_payload() {
        let payload = json!({"funding_rates": [
            {"market": "ETH-USD", "fundingRate": 0.0002}
        ]});
        let quotes = normalize(&payload).unwrap();
        assert_eq!(quotes["ETH"].funding_rate, 0.0002);
        assert_eq!(quotes["ETH"].mark_price, 0.0);
    }

    #[test]
    fn entries_without_any_symbol_key_are_skipped() {
        let payload = json!([{"funding_rate": 0.5}, {"symbol": "SOL", "rate": 0.0003}]);
        let quotes = normalize(&payload).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes["SOL"].funding_rate, 0.0003);
    }

    #[test]
    fn payload_without_entries_is_a_parse_error() {
        assert!(matches!(
            normalize(&json!({"status": "ok"})),
            Err(FetchError::Parse(_))
        ));
    }
}
