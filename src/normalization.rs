use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    // Trailing quote-currency and contract-type suffixes on concatenated
    // symbols, e.g. BTCUSDT, BTCUSD, BTCUSDTPERP.
    static ref RE_PERP_SUFFIX: Regex = Regex::new(r"PERP$").unwrap();
    static ref RE_QUOTE_SUFFIX: Regex = Regex::new(r"USDT?$").unwrap();
}

/// Normalizes a concatenated contract name to its base-asset ticker:
/// `BTCUSDT` -> `BTC`, `BTCUSDTPERP` -> `BTC`, `ETHUSD` -> `ETH`.
/// Already-bare tickers pass through unchanged.
pub fn strip_contract_suffix(symbol: &str) -> String {
    let without_perp = RE_PERP_SUFFIX.replace(symbol, "");
    RE_QUOTE_SUFFIX.replace(&without_perp, "").to_string()
}

/// Extracts the base asset from a delimiter-separated symbol:
/// `BTC_USDC_PERP` -> `BTC`, `BTC-USD-PERP` -> `BTC`. Splits on `_` first,
/// then `-`, and takes the leading segment.
pub fn base_from_delimited(symbol: &str) -> String {
    symbol
        .split('_')
        .next()
        .unwrap_or(symbol)
        .split('-')
        .next()
        .unwrap_or(symbol)
        .to_string()
}

/// Converts a funding rate quoted on a multi-hour native period to the common
/// hourly basis. Called exactly once, at the adapter boundary, so rates that
/// are already hourly are never divided again.
pub fn to_hourly(rate: f64, native_period_hours: f64) -> f64 {
    rate / native_period_hours
}

/// Tries each candidate key against a JSON object in order and returns the
/// first numeric value found, accepting both JSON numbers and numeric
/// strings. Falls back to 0.0 when every candidate is absent, keeping
/// downstream arithmetic safe.
pub fn first_f64(value: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .filter_map(|key| as_f64(&value[*key]))
        .next()
        .unwrap_or(0.0)
}

/// Tries each candidate key in order and returns the first string value.
pub fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().filter_map(|key| value[*key].as_str()).next()
}

/// Lenient numeric coercion: exchanges flip between numbers and stringified
/// numbers across API versions.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}
