use rustc_hash::FxHashMap;
use std::sync::Arc;

use ccbench_core::{Record, Storage, Value};

/// What a transaction attempt observed the first time it read a key:
/// whether the key existed, and at what version. Captured once per key per
/// attempt — later reads of the same key must not overwrite this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadVersion {
    pub exists: bool,
    pub version: u64,
}

impl ReadVersion {
    fn absent() -> Self {
        ReadVersion {
            exists: false,
            version: 0,
        }
    }

    fn of(record: &Record) -> Self {
        ReadVersion {
            exists: true,
            version: record.version,
        }
    }
}

/// Per-attempt buffer of reads and writes against a shared `Storage`.
///
/// A context is opened fresh for every attempt (not every transaction — a
/// retried transaction gets a new context each time). Reads are served from
/// the write set first (read-own-writes), then from storage, memoizing the
/// first-observed version into the read set. Writes simply overwrite the
/// write-set entry (last-write-wins within the attempt); nothing reaches
/// storage until the owning `CcStrategy::commit` applies the write set.
pub struct TransactionContext {
    storage: Arc<dyn Storage>,
    read_set: FxHashMap<String, ReadVersion>,
    write_set: FxHashMap<String, Record>,
}

impl TransactionContext {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        TransactionContext {
            storage,
            read_set: FxHashMap::default(),
            write_set: FxHashMap::default(),
        }
    }

    pub fn read(&mut self, key: &str) -> Option<Record> {
        if let Some(record) = self.write_set.get(key) {
            return Some(record.clone());
        }
        let record = self.storage.get(key);
        self.read_set.entry(key.to_string()).or_insert_with(|| {
            record
                .as_ref()
                .map(ReadVersion::of)
                .unwrap_or_else(ReadVersion::absent)
        });
        record
    }

    pub fn write(&mut self, key: &str, record: Record) {
        self.write_set.insert(key.to_string(), record);
    }

    pub fn read_int(&mut self, key: &str, field: &str, default: i64) -> i64 {
        self.read(key)
            .and_then(|r| r.get_int(field))
            .unwrap_or(default)
    }

    pub fn write_int(&mut self, key: &str, field: &str, value: i64) {
        let mut record = self.read(key).unwrap_or_else(|| Record::new(0));
        record.fields.insert(field.to_string(), Value::Int(value));
        self.write(key, record);
    }

    pub fn read_set(&self) -> &FxHashMap<String, ReadVersion> {
        &self.read_set
    }

    pub fn write_set(&self) -> &FxHashMap<String, Record> {
        &self.write_set
    }
}
