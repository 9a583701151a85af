use crate::adapters::{check_status, ExchangeAdapter, QuoteMap};
use crate::errors::FetchError;
use crate::normalization::as_f64;
use crate::shared_types::{ExchangeId, ExchangeQuote};
use async_trait::async_trait;
use serde_json::{json, Value};

const INFO_URL: &str = "https://api.hyperliquid.xyz/info";

/// Single-call adapter. One `metaAndAssetCtxs` request returns the asset
/// universe and a parallel array of per-asset contexts; the two are zipped by
/// index. Rates are already quoted hourly.
pub struct HyperliquidAdapter;

#[async_trait]
impl ExchangeAdapter for HyperliquidAdapter {
    fn id(&self) -> ExchangeId {
        ExchangeId::Hyperliquid
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<QuoteMap, FetchError> {
        let response = client
            .post(INFO_URL)
            .json(&json!({"type": "metaAndAssetCtxs"}))
            .send()
            .await?;
        let payload: Value = check_status(response)?.json().await?;
        normalize(&payload)
    }
}

fn normalize(payload: &Value) -> Result<QuoteMap, FetchError> {
    let universe = payload[0]["universe"]
        .as_array()
        .ok_or_else(|| FetchError::Parse("missing universe array".to_string()))?;
    let ctxs = payload[1]
        .as_array()
        .ok_or_else(|| FetchError::Parse("missing asset context array".to_string()))?;

    let mut quotes = QuoteMap::new();
    for (asset, ctx) in universe.iter().zip(ctxs) {
        let symbol = match asset["name"].as_str() {
            Some(name) => name,
            None => continue,
        };
        // Assets without a funding context are skipped, not zero-filled.
        let funding_rate = match as_f64(&ctx["funding"]) {
            Some(rate) => rate,
            None => continue,
        };
        quotes.insert(
            symbol.to_string(),
            ExchangeQuote {
                funding_rate,
                mark_price: as_f64(&ctx["markPx"]).unwrap_or(0.0),
                volume_24h: as_f64(&ctx["dayNtlVlm"]).unwrap_or(0.0),
            },
        );
    }
    Ok(quotes)
}
