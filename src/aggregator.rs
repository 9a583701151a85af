use crate::adapters::QuoteMap;
use crate::shared_types::{ExchangeId, SymbolRecord};
use std::collections::HashMap;

/// Unions per-exchange quote maps into one record per symbol. A symbol needs
/// only one quoting exchange to appear; exchanges that lack it are simply
/// absent from the record's quote map.
///
/// Output order is insertion order of first encounter across the given
/// exchange order. Deterministic, but consumers must sort explicitly if they
/// care about ordering.
pub fn merge(quotes_by_exchange: Vec<(ExchangeId, QuoteMap)>) -> Vec<SymbolRecord> {
    let mut records: Vec<SymbolRecord> = Vec::new();
    let mut index_by_symbol: HashMap<String, usize> = HashMap::new();

    for (exchange, quotes) in quotes_by_exchange {
        // Iterate symbols in sorted order so first-encounter order is stable
        // across runs despite the hash-map source.
        let mut symbols: Vec<_> = quotes.into_iter().collect();
        symbols.sort_by(|a, b| a.0.cmp(&b.0));

        for (symbol, quote) in symbols {
            let idx = *index_by_symbol.entry(symbol.clone()).or_insert_with(|| {
                records.push(SymbolRecord::new(symbol));
                records.len() - 1
            });
            records[idx].quotes.insert(exchange, quote);
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_types::ExchangeQuote;
    use crate::spread_engine::annotate;

    fn quote(rate: f64) -> ExchangeQuote {
        ExchangeQuote {
            funding_rate: rate,
            mark_price: 100.0,
            volume_24h: 1000.0,
        }
    }

    fn quote_map(entries: &[(&str, f64)]) -> QuoteMap {
        entries
            .iter()
            .map(|(symbol, rate)| (symbol.to_string(), quote(*rate)))
            .collect()
    }

    #[test]
    fn merge_is_union_not_intersection() {
        let merged = merge(vec![
            (ExchangeId::Hyperliquid, quote_map(&[("BTC", 0.0001)])),
            (ExchangeId::Grvt, quote_map(&[("ETH", 0.0002)])),
        ]);

        assert_eq!(merged.len(), 2);
        let btc = merged.iter().find(|r| r.symbol == "BTC").unwrap();
        let eth = merged.iter().find(|r| r.symbol == "ETH").unwrap();
        assert_eq!(btc.quotes.len(), 1);
        assert!(btc.quotes.contains_key(&ExchangeId::Hyperliquid));
        assert_eq!(eth.quotes.len(), 1);
        assert!(eth.quotes.contains_key(&ExchangeId::Grvt));
    }

    #[test]
    fn record_holds_exactly_the_reporting_exchanges() {
        let merged = merge(vec![
            (ExchangeId::Hyperliquid, quote_map(&[("BTC", 0.0001)])),
            (ExchangeId::Paradex, quote_map(&[("BTC", 0.0003), ("SOL", 0.0)])),
        ]);

        let btc = merged.iter().find(|r| r.symbol == "BTC").unwrap();
        assert_eq!(btc.quotes.len(), 2);
        assert!(!btc.quotes.contains_key(&ExchangeId::Grvt));
    }

    #[test]
    fn order_is_first_encounter_across_exchange_order() {
        let merged = merge(vec![
            (ExchangeId::Hyperliquid, quote_map(&[("ETH", 0.1), ("BTC", 0.2)])),
            (ExchangeId::Grvt, quote_map(&[("AAVE", 0.3), ("BTC", 0.4)])),
        ]);
        let symbols: Vec<&str> = merged.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "AAVE"]);
    }

    // End-to-end over merge + annotate: the scenario a user sees when
    // hyperliquid quotes only BTC and grvt quotes BTC and ETH.
    #[test]
    fn merged_records_annotate_against_main_exchange() {
        let mut merged = merge(vec![
            (ExchangeId::Hyperliquid, quote_map(&[("BTC", 0.0001)])),
            (ExchangeId::Grvt, quote_map(&[("BTC", 0.00015), ("ETH", 0.0002)])),
        ]);
        annotate(&mut merged, ExchangeId::Hyperliquid);

        let btc = merged.iter().find(|r| r.symbol == "BTC").unwrap();
        assert!((btc.diffs_vs_main[&ExchangeId::Grvt] - 0.00005).abs() < 1e-12);
        assert!((btc.max_spread - 0.00005).abs() < 1e-12);

        // Hyperliquid has no ETH quote, so the ETH record carries no diffs.
        let eth = merged.iter().find(|r| r.symbol == "ETH").unwrap();
        assert!(eth.diffs_vs_main.is_empty());
    }
}
