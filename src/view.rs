use crate::shared_types::{ExchangeId, SymbolRecord};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Sort targets mirroring the table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Symbol,
    MainRate,
    MainVolume,
    MaxSpread,
    Rate(ExchangeId),
    DiffVsMain(ExchangeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Explicit view state passed into the presentation pipeline instead of
/// process-wide globals. The core pipeline never depends on it; only the
/// table rendering does.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub main_exchange: ExchangeId,
    pub search: String,
    pub visible_exchanges: HashSet<ExchangeId>,
    pub favorites: HashSet<String>,
    pub favorites_only: bool,
    pub sort_key: SortKey,
    pub direction: SortDirection,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            main_exchange: ExchangeId::Hyperliquid,
            search: String::new(),
            visible_exchanges: ExchangeId::ALL.into_iter().collect(),
            favorites: HashSet::new(),
            favorites_only: false,
            sort_key: SortKey::MainVolume,
            direction: SortDirection::Descending,
        }
    }
}

impl ViewState {
    /// Column order for rendering: main exchange first, then the remaining
    /// visible exchanges in canonical order. The main exchange is always
    /// shown regardless of the visibility set.
    pub fn ordered_columns(&self) -> Vec<ExchangeId> {
        let mut columns = vec![self.main_exchange];
        columns.extend(
            ExchangeId::ALL
                .into_iter()
                .filter(|ex| *ex != self.main_exchange && self.visible_exchanges.contains(ex)),
        );
        columns
    }
}

/// Filters and sorts annotated records for display. Records without a
/// main-exchange quote are always excluded since no diff can be computed for
/// them. Assumes `spread_engine::annotate` already ran with the same main
/// exchange.
pub fn apply(records: &[SymbolRecord], view: &ViewState) -> Vec<SymbolRecord> {
    let search = view.search.to_lowercase();
    let mut visible: Vec<SymbolRecord> = records
        .iter()
        .filter(|record| record.quotes.contains_key(&view.main_exchange))
        .filter(|record| search.is_empty() || record.symbol.to_lowercase().contains(&search))
        .filter(|record| !view.favorites_only || view.favorites.contains(&record.symbol))
        .cloned()
        .collect();

    visible.sort_by(|a, b| {
        let ordering = match view.sort_key {
            SortKey::Symbol => a.symbol.cmp(&b.symbol),
            _ => {
                let lhs = sort_value(a, view);
                let rhs = sort_value(b, view);
                lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal)
            }
        };
        match view.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    visible
}

fn sort_value(record: &SymbolRecord, view: &ViewState) -> f64 {
    match view.sort_key {
        SortKey::Symbol => 0.0,
        SortKey::MainRate => record.funding_rate(view.main_exchange).unwrap_or(0.0),
        SortKey::MainVolume => record
            .quotes
            .get(&view.main_exchange)
            .map(|q| q.volume_24h)
            .unwrap_or(0.0),
        SortKey::MaxSpread => record.max_spread,
        SortKey::Rate(exchange) => record.funding_rate(exchange).unwrap_or(0.0),
        SortKey::DiffVsMain(exchange) => {
            record.diffs_vs_main.get(&exchange).copied().unwrap_or(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_types::ExchangeQuote;
    use crate::spread_engine::annotate;

    fn record(symbol: &str, rates: &[(ExchangeId, f64, f64)]) -> SymbolRecord {
        let mut record = SymbolRecord::new(symbol);
        for (exchange, rate, volume) in rates {
            record.quotes.insert(
                *exchange,
                ExchangeQuote {
                    funding_rate: *rate,
                    mark_price: 100.0,
                    volume_24h: *volume,
                },
            );
        }
        record
    }

    fn sample() -> Vec<SymbolRecord> {
        let mut records = vec![
            record(
                "BTC",
                &[
                    (ExchangeId::Hyperliquid, 0.0001, 900.0),
                    (ExchangeId::Grvt, 0.0003, 10.0),
                ],
            ),
            record("ETH", &[(ExchangeId::Hyperliquid, -0.0002, 500.0)]),
            record("SOL", &[(ExchangeId::Grvt, 0.0005, 100.0)]),
        ];
        annotate(&mut records, ExchangeId::Hyperliquid);
        records
    }

    #[test]
    fn records_without_a_main_quote_are_excluded() {
        let shown = apply(&sample(), &ViewState::default());
        let symbols: Vec<&str> = shown.iter().map(|r| r.symbol.as_str()).collect();
        assert!(!symbols.contains(&"SOL"));
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn search_filters_case_insensitively() {
        let view = ViewState {
            search: "bt".to_string(),
            ..ViewState::default()
        };
        let shown = apply(&sample(), &view);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].symbol, "BTC");
    }

    #[test]
    fn favorites_only_restricts_to_favorites() {
        let view = ViewState {
            favorites: ["ETH".to_string()].into_iter().collect(),
            favorites_only: true,
            ..ViewState::default()
        };
        let shown = apply(&sample(), &view);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].symbol, "ETH");
    }

    #[test]
    fn default_sort_is_main_volume_descending() {
        let shown = apply(&sample(), &ViewState::default());
        let symbols: Vec<&str> = shown.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "ETH"]);
    }

    #[test]
    fn sorting_by_symbol_ascending() {
        let view = ViewState {
            sort_key: SortKey::Symbol,
            direction: SortDirection::Ascending,
            ..ViewState::default()
        };
        let shown = apply(&sample(), &view);
        let symbols: Vec<&str> = shown.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "ETH"]);
    }

    #[test]
    fn sorting_by_max_spread_descending_puts_widest_first() {
        let view = ViewState {
            sort_key: SortKey::MaxSpread,
            ..ViewState::default()
        };
        let shown = apply(&sample(), &view);
        assert_eq!(shown[0].symbol, "BTC");
    }

    #[test]
    fn main_exchange_leads_the_column_order() {
        let view = ViewState {
            main_exchange: ExchangeId::Paradex,
            ..ViewState::default()
        };
        let columns = view.ordered_columns();
        assert_eq!(columns[0], ExchangeId::Paradex);
        assert_eq!(columns.len(), 5);

        let narrowed = ViewState {
            main_exchange: ExchangeId::Paradex,
            visible_exchanges: [ExchangeId::Grvt].into_iter().collect(),
            ..ViewState::default()
        };
        assert_eq!(
            narrowed.ordered_columns(),
            vec![ExchangeId::Paradex, ExchangeId::Grvt]
        );
    }
}
