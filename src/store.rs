//! In-memory record store backing all mock responses
//!
//! The store is a mapping from transaction hash to a fabricated record,
//! loaded wholesale from a JSON file. Handlers only ever read; the sole
//! mutation is a full replacement on load/refresh. Readers take an `Arc`
//! snapshot, and a refresh builds the new map off to the side and swaps it
//! in, so a reader never observes a half-replaced store.

use crate::error::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single token movement embedded in a transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub from: String,
    pub to: String,
    /// Non-negative integer as a decimal string. Parsed to `U256` only
    /// inside the aggregation engine, where a bad literal is a hard error.
    pub amount: String,
}

/// Wrapper matching the persisted `transferLog.transfer` nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLog {
    pub transfer: TransferEvent,
}

/// One fabricated transaction, keyed by its hash in the store.
///
/// Absent fields stay `None` here; sentinel block numbers and current-time
/// timestamps are applied only at response-synthesis time, per the
/// configured defaulting policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "blockNumber", skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(rename = "transferLog", skip_serializing_if = "Option::is_none")]
    pub transfer_log: Option<TransferLog>,
}

impl TransactionRecord {
    pub fn transfer(&self) -> Option<&TransferEvent> {
        self.transfer_log.as_ref().map(|log| &log.transfer)
    }
}

pub type RecordMap = HashMap<String, TransactionRecord>;

/// Swappable snapshot of the transaction table.
pub struct RecordStore {
    path: PathBuf,
    records: RwLock<Arc<RecordMap>>,
}

impl RecordStore {
    /// Create an empty store bound to a backing file. Call [`load`] to
    /// populate it.
    ///
    /// [`load`]: RecordStore::load
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: RwLock::new(Arc::new(RecordMap::new())),
        }
    }

    /// Replace the entire mapping from the backing file and return the new
    /// entry count.
    ///
    /// Any read or parse failure leaves the store EMPTY rather than keeping
    /// the previous contents: the fail-safe state is "no data", never
    /// "stale data". The swap is atomic from a reader's perspective.
    pub fn load(&self) -> usize {
        let next = match read_records(&self.path) {
            Ok(map) => {
                tracing::info!(
                    entries = map.len(),
                    path = %self.path.display(),
                    "store.loaded"
                );
                map
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "store.load_failed, serving empty"
                );
                RecordMap::new()
            }
        };

        let next = Arc::new(next);
        let len = next.len();
        *self.records.write() = next;
        len
    }

    /// Consistent point-in-time view of the whole table. Cheap `Arc` clone;
    /// the lock is held only for the clone, never across an aggregation.
    pub fn snapshot(&self) -> Arc<RecordMap> {
        self.records.read().clone()
    }

    pub fn get(&self, hash: &str) -> Option<TransactionRecord> {
        self.snapshot().get(hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_records(path: &Path) -> Result<RecordMap> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_blob(dir: &tempfile::TempDir, name: &str, json: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_nested_transfer_shape() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_blob(
            &dir,
            "pegasus.json",
            r#"{"abc123":{"blockNumber":45000001,"timestamp":1700000000000,
                "transferLog":{"transfer":{"from":"TA","to":"TB","amount":"500000"}}}}"#,
        );

        let store = RecordStore::new(path);
        assert_eq!(store.load(), 1);

        let record = store.get("abc123").unwrap();
        assert_eq!(record.block_number, Some(45_000_001));
        assert_eq!(record.timestamp, Some(1_700_000_000_000));
        let transfer = record.transfer().unwrap();
        assert_eq!(transfer.from, "TA");
        assert_eq!(transfer.to, "TB");
        assert_eq!(transfer.amount, "500000");
    }

    #[test]
    fn records_may_omit_every_optional_field() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_blob(&dir, "pegasus.json", r#"{"deadbeef":{}}"#);

        let store = RecordStore::new(path);
        assert_eq!(store.load(), 1);

        let record = store.get("deadbeef").unwrap();
        assert_eq!(record.block_number, None);
        assert_eq!(record.timestamp, None);
        assert!(record.transfer().is_none());
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn bad_json_empties_rather_than_keeping_stale_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_blob(&dir, "pegasus.json", r#"{"abc":{}}"#);
        let store = RecordStore::new(&path);
        assert_eq!(store.load(), 1);

        fs::write(&path, "{not json").unwrap();
        assert_eq!(store.load(), 0);
        assert!(store.get("abc").is_none());
    }

    #[test]
    fn snapshot_survives_a_refresh() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_blob(&dir, "pegasus.json", r#"{"old":{}}"#);
        let store = RecordStore::new(&path);
        store.load();

        let before = store.snapshot();
        fs::write(&path, r#"{"new1":{},"new2":{}}"#).unwrap();
        assert_eq!(store.load(), 2);

        // The pre-refresh reader still sees the old table in full.
        assert_eq!(before.len(), 1);
        assert!(before.contains_key("old"));

        let after = store.snapshot();
        assert_eq!(after.len(), 2);
        assert!(after.contains_key("new1"));
    }
}
