use crate::adapters::{check_status, ExchangeAdapter, QuoteMap};
use crate::errors::FetchError;
use crate::normalization::{first_f64, strip_contract_suffix};
use crate::shared_types::{ExchangeId, ExchangeQuote};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

const META_URL: &str = "https://pro.edgex.exchange/api/v1/public/meta/getMetaData";
const FUNDING_URL: &str =
    "https://pro.edgex.exchange/api/v1/public/funding/getLatestFundingRate";

#[derive(Deserialize)]
struct MetaResponse {
    #[serde(default)]
    data: MetaData,
}

#[derive(Deserialize, Default)]
struct MetaData {
    #[serde(rename = "contractList", default)]
    contract_list: Vec<Contract>,
}

#[derive(Deserialize, Clone)]
struct Contract {
    #[serde(rename = "contractId")]
    contract_id: String,
    #[serde(rename = "contractName")]
    contract_name: String,
}

enum FundingFetch {
    Quote(String, ExchangeQuote),
    Skipped { contract: String, reason: FetchError },
}

/// Two-phase adapter: the metadata call enumerates contracts, then one
/// funding request per contract id. The funding endpoint carries no volume.
pub struct EdgexAdapter {
    detail_concurrency: usize,
}

impl EdgexAdapter {
    pub fn new(detail_concurrency: usize) -> Self {
        EdgexAdapter { detail_concurrency }
    }
}

#[async_trait]
impl ExchangeAdapter for EdgexAdapter {
    fn id(&self) -> ExchangeId {
        ExchangeId::Edgex
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<QuoteMap, FetchError> {
        let response = client.get(META_URL).send().await?;
        let meta: MetaResponse = check_status(response)?.json().await?;

        let fetches = meta
            .data
            .contract_list
            .into_iter()
            .map(|contract| fetch_funding(client, contract));
        let outcomes: Vec<FundingFetch> = futures::stream::iter(fetches)
            .buffer_unordered(self.detail_concurrency.max(1))
            .collect()
            .await;

        let mut quotes = QuoteMap::new();
        for outcome in outcomes {
            match outcome {
                FundingFetch::Quote(symbol, quote) => {
                    quotes.insert(symbol, quote);
                }
                FundingFetch::Skipped { contract, reason } => {
                    warn!(exchange = "edgex", %contract, error = %reason, "skipping contract");
                }
            }
        }
        Ok(quotes)
    }
}

async fn fetch_funding(client: &reqwest::Client, contract: Contract) -> FundingFetch {
    match funding_quote(client, &contract.contract_id).await {
        Ok(quote) => FundingFetch::Quote(strip_contract_suffix(&contract.contract_name), quote),
        Err(reason) => FundingFetch::Skipped {
            contract: contract.contract_name,
            reason,
        },
    }
}

async fn funding_quote(client: &reqwest::Client, contract_id: &str) -> Result<ExchangeQuote, FetchError> {
    let response = client
        .get(FUNDING_URL)
        .query(&[("contractId", contract_id)])
        .send()
        .await?;
    let payload: Value = check_status(response)?.json().await?;
    normalize_funding(&payload)
}

fn normalize_funding(payload: &Value) -> Result<ExchangeQuote, FetchError> {
    // The funding payload is an array; the first element is the latest rate.
    let latest = payload["data"]
        .as_array()
        .and_then(|entries| entries.first())
        .ok_or_else(|| FetchError::Parse("empty funding data array".to_string()))?;
    Ok(ExchangeQuote {
        funding_rate: first_f64(latest, &["fundingRate"]),
        mark_price: first_f64(latest, &["indexPrice", "oraclePrice"]),
        volume_24h: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn takes_first_entry_of_funding_array() {
        let payload = json!({"data": [
            {"fundingRate": "0.00005", "indexPrice": "65000.0"},
            {"fundingRate": "0.00009", "indexPrice": "64000.0"}
        ]});
        let quote = normalize_funding(&payload).unwrap();
        assert_eq!(quote.funding_rate, 0.00005);
        assert_eq!(quote.mark_price, 65000.0);
        assert_eq!(quote.volume_24h, 0.0);
    }

    #[test]
    fn falls_back_to_oracle_price_when_index_missing() {
        let payload = json!({"data": [{"fundingRate": 0.0001, "oraclePrice": 3200.0}]});
        let quote = normalize_funding(&payload).unwrap();
        assert_eq!(quote.mark_price, 3200.0);
    }

    #[test]
    fn empty_funding_array_is_a_parse_error() {
        assert!(matches!(
            normalize_funding(&json!({"data": []})),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn contract_names_normalize_to_base_tickers() {
        assert_eq!(strip_contract_suffix("BTCUSDT"), "BTC");
        assert_eq!(strip_contract_suffix("BTCUSDTPERP"), "BTC");
    }
}
