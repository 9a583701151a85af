use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The exchanges tracked by the comparator. The lowercase string form is the
/// identifier used in the snapshot artifact and in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Hyperliquid,
    Grvt,
    Edgex,
    Lighter,
    Paradex,
}

impl ExchangeId {
    /// Canonical processing order. Merge output order and the snapshot's
    /// exchange list both follow this.
    pub const ALL: [ExchangeId; 5] = [
        ExchangeId::Hyperliquid,
        ExchangeId::Grvt,
        ExchangeId::Edgex,
        ExchangeId::Lighter,
        ExchangeId::Paradex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Hyperliquid => "hyperliquid",
            ExchangeId::Grvt => "grvt",
            ExchangeId::Edgex => "edgex",
            ExchangeId::Lighter => "lighter",
            ExchangeId::Paradex => "paradex",
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExchangeId::ALL
            .into_iter()
            .find(|ex| ex.as_str() == s)
            .ok_or_else(|| format!("unknown exchange: {}", s))
    }
}

/// One exchange's view of one asset. Funding rate is a signed fraction on the
/// common hourly basis; mark price and volume are 0.0 when the exchange does
/// not provide them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeQuote {
    pub funding_rate: f64,
    pub mark_price: f64,
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
}

/// Merged per-asset record. `quotes` holds exactly the exchanges that
/// reported this symbol. The derived fields are recomputed as a whole by the
/// spread engine and are never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRecord {
    pub symbol: String,
    pub quotes: HashMap<ExchangeId, ExchangeQuote>,
    /// max(rate) - min(rate) over reporting exchanges; 0.0 is the sentinel
    /// for "fewer than two quotes, no comparison possible".
    pub max_spread: f64,
    /// Signed diff vs. the current main exchange, positive meaning the keyed
    /// exchange pays a higher rate. Absent for the main exchange itself and
    /// for exchanges without a quote.
    pub diffs_vs_main: HashMap<ExchangeId, f64>,
}

impl SymbolRecord {
    pub fn new(symbol: impl Into<String>) -> Self {
        SymbolRecord {
            symbol: symbol.into(),
            quotes: HashMap::new(),
            max_spread: 0.0,
            diffs_vs_main: HashMap::new(),
        }
    }

    pub fn funding_rate(&self, exchange: ExchangeId) -> Option<f64> {
        self.quotes.get(&exchange).map(|q| q.funding_rate)
    }
}

/// A full fetch-cycle result as persisted and reloaded by the snapshot store.
/// Immutable once written; replaced wholesale, never patched.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<SymbolRecord>,
    pub generated_at: DateTime<Utc>,
    pub exchanges: Vec<ExchangeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_id_round_trips_through_str() {
        for ex in ExchangeId::ALL {
            assert_eq!(ex.as_str().parse::<ExchangeId>().unwrap(), ex);
        }
        assert!("binance".parse::<ExchangeId>().is_err());
    }

    #[test]
    fn quote_serializes_with_wire_field_names() {
        let quote = ExchangeQuote {
            funding_rate: 0.0001,
            mark_price: 65000.0,
            volume_24h: 1_000_000.0,
        };
        let json = serde_json::to_value(quote).unwrap();
        assert_eq!(json["fundingRate"], 0.0001);
        assert_eq!(json["markPrice"], 65000.0);
        assert_eq!(json["volume24h"], 1_000_000.0);
    }
}
