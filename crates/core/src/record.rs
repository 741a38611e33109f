use rustc_hash::FxHashMap;

use crate::value::Value;

/// A versioned bag of named fields.
///
/// Version is opaque to callers: it starts at 1 on a key's first successful
/// write and is incremented by exactly one on every subsequent write to that
/// key. A `Record` with `version == 0` denotes a bulk-loaded row that has
/// never been through a transactional write (see `Storage::bulk_load`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: FxHashMap<String, Value>,
    pub version: u64,
}

impl Record {
    pub fn new(version: u64) -> Self {
        Record {
            fields: FxHashMap::default(),
            version,
        }
    }

    pub fn get_int(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(Value::as_int)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn set_int(&mut self, field: impl Into<String>, value: i64) {
        self.fields.insert(field.into(), Value::Int(value));
    }

    pub fn set_str(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), Value::Str(value.into()));
    }

    /// The version this record should carry after a write that observed
    /// `self` as the prior state (or `None` if the key was absent).
    pub fn next_version(prior: Option<&Record>) -> u64 {
        prior.map(|r| r.version + 1).unwrap_or(1)
    }
}
