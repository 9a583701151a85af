use crate::shared_types::{ExchangeId, SymbolRecord};

/// Recomputes the derived fields of every record against the chosen main
/// exchange. Total re-derivation: previous diffs are cleared first, so no
/// stale entry from an earlier main-exchange selection survives. Pure and
/// cheap (symbols x exchanges), safe to run on every selection change.
pub fn annotate(records: &mut [SymbolRecord], main_exchange: ExchangeId) {
    for record in records.iter_mut() {
        record.max_spread = max_spread(record);
        record.diffs_vs_main.clear();

        // No main-exchange rate means no comparison basis: the record keeps
        // its quotes but gets no diffs (the view filters it out).
        let main_rate = match record.funding_rate(main_exchange) {
            Some(rate) => rate,
            None => continue,
        };

        for (&exchange, quote) in &record.quotes {
            if exchange != main_exchange {
                record
                    .diffs_vs_main
                    .insert(exchange, quote.funding_rate - main_rate);
            }
        }
    }
}

/// Widest pairwise funding gap over all reporting exchanges. 0.0 is the
/// sentinel for "fewer than two quotes"; the view renders it as no data
/// rather than a genuine zero spread.
fn max_spread(record: &SymbolRecord) -> f64 {
    if record.quotes.len() < 2 {
        return 0.0;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for quote in record.quotes.values() {
        min = min.min(quote.funding_rate);
        max = max.max(quote.funding_rate);
    }
    max - min
}
