use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use ccbench_core::{Record, Storage};

/// A `Storage` backed by a single mutex-guarded hash map.
///
/// This is the baseline backend: no durability, no sharding, one lock for
/// the whole table. Contention on that lock is part of what the benchmark
/// is measuring, not an implementation defect to optimize away.
#[derive(Default)]
pub struct InMemoryStorage {
    table: Mutex<FxHashMap<String, Record>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            table: Mutex::new(FxHashMap::default()),
        }
    }
}

impl Storage for InMemoryStorage {
    fn get(&self, key: &str) -> Option<Record> {
        self.table.lock().get(key).cloned()
    }

    fn put(&self, key: &str, record: Record) {
        self.table.lock().insert(key.to_string(), record);
    }

    fn keys(&self) -> Vec<String> {
        let mut ks: Vec<String> = self.table.lock().keys().cloned().collect();
        ks.sort();
        ks
    }
}
