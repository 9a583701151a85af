use crate::errors::StoreError;
use crate::shared_types::{ExchangeId, ExchangeQuote, Snapshot, SymbolRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// On-disk schema. Each record is the symbol plus one key per reporting
/// exchange; derived fields (max spread, diffs) are never persisted because
/// they depend on the user-selected main exchange.
#[derive(Serialize, Deserialize)]
struct RawSnapshot {
    data: Vec<RawRecord>,
    timestamp: String,
    exchanges: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct RawRecord {
    symbol: String,
    #[serde(flatten)]
    quotes: BTreeMap<String, Value>,
}

/// Durable store for the merged record set. Single writer (the fetch cycle),
/// many readers; atomic replace is the only synchronization needed.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full-replace write: serialize to a sibling temp file, then rename over
    /// the artifact so no reader ever observes a half-written snapshot.
    pub fn write(
        &self,
        records: &[SymbolRecord],
        generated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let raw = RawSnapshot {
            data: records.iter().map(to_raw_record).collect(),
            timestamp: generated_at.to_rfc3339(),
            exchanges: ExchangeId::ALL.iter().map(|ex| ex.to_string()).collect(),
        };
        let body = serde_json::to_vec_pretty(&raw)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, body)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn read(&self) -> Result<Snapshot, StoreError> {
        let body = match fs::read(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let raw: RawSnapshot =
            serde_json::from_slice(&body).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let generated_at = DateTime::parse_from_rfc3339(&raw.timestamp)
            .map_err(|e| StoreError::Corrupt(format!("bad timestamp: {}", e)))?
            .with_timezone(&Utc);

        let exchanges = raw
            .exchanges
            .iter()
            .filter_map(|name| name.parse::<ExchangeId>().ok())
            .collect();

        // Symbols are unique within a snapshot. Our writer merges by symbol
        // so it never emits duplicates, but a foreign artifact might; keep
        // the later entry rather than surfacing duplicate records.
        let mut records: Vec<SymbolRecord> = Vec::new();
        let mut index_by_symbol: HashMap<String, usize> = HashMap::new();
        for raw_record in raw.data {
            let record = from_raw_record(raw_record);
            match index_by_symbol.get(&record.symbol) {
                Some(&idx) => {
                    warn!(symbol = %record.symbol, "duplicate symbol in snapshot, keeping later entry");
                    records[idx] = record;
                }
                None => {
                    index_by_symbol.insert(record.symbol.clone(), records.len());
                    records.push(record);
                }
            }
        }

        Ok(Snapshot {
            records,
            generated_at,
            exchanges,
        })
    }
}

fn to_raw_record(record: &SymbolRecord) -> RawRecord {
    let quotes = record
        .quotes
        .iter()
        .map(|(exchange, quote)| {
            // Plain struct of f64 fields, serialization cannot fail.
            let value = serde_json::to_value(quote).unwrap_or(Value::Null);
            (exchange.to_string(), value)
        })
        .collect();
    RawRecord {
        symbol: record.symbol.clone(),
        quotes,
    }
}

fn from_raw_record(raw: RawRecord) -> SymbolRecord {
    let mut record = SymbolRecord::new(raw.symbol);
    for (name, value) in raw.quotes {
        let exchange = match name.parse::<ExchangeId>() {
            Ok(exchange) => exchange,
            Err(_) => {
                warn!(key = %name, symbol = %record.symbol, "skipping unknown exchange key");
                continue;
            }
        };
        match serde_json::from_value::<ExchangeQuote>(value) {
            Ok(quote) => {
                record.quotes.insert(exchange, quote);
            }
            Err(e) => {
                warn!(%exchange, symbol = %record.symbol, error = %e, "skipping malformed quote");
            }
        }
    }
    record
}
