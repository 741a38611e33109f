use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use ccbench_core::{Record, Storage};

use crate::context::TransactionContext;
use crate::lock_manager::LockManager;
use crate::strategy::CcStrategy;

/// Conservative two-phase locking: an attempt acquires exclusive locks on
/// its entire planned key set atomically before its body runs, and holds
/// them until the attempt ends. There is no deadlock detection because
/// there is no partial acquisition to deadlock on — `before_txn` either
/// gets every key it asked for or none of them.
///
/// `commit` still re-validates the read set the same way OCC does. Planned
/// keys and actually-read keys can differ (a body may read a key it never
/// locked, or lock a key it ends up not reading), so holding the locks does
/// not by itself prove the read set is still fresh.
pub struct C2pl {
    locks: LockManager,
    held_by_txn: Mutex<FxHashMap<u64, Vec<String>>>,
}

impl Default for C2pl {
    fn default() -> Self {
        C2pl::new()
    }
}

impl C2pl {
    pub fn new() -> Self {
        C2pl {
            locks: LockManager::new(),
            held_by_txn: Mutex::new(FxHashMap::default()),
        }
    }
}

impl CcStrategy for C2pl {
    fn name(&self) -> &'static str {
        "c2pl"
    }

    fn before_txn(&self, txn_id: u64, planned_keys: &[String], reason: &mut String) -> bool {
        if !self.locks.try_lock_exclusive_many(planned_keys) {
            *reason = "c2pl_lock_conflict".to_string();
            tracing::debug!(txn_id, "c2pl lock conflict");
            return false;
        }
        let mut sorted: Vec<String> = planned_keys.to_vec();
        sorted.sort();
        sorted.dedup();
        self.held_by_txn.lock().insert(txn_id, sorted);
        true
    }

    fn commit(
        &self,
        storage: &Arc<dyn Storage>,
        ctx: &TransactionContext,
        reason: &mut String,
    ) -> bool {
        for (key, observed) in ctx.read_set() {
            let current = storage.get(key);
            let (exists, version) = match &current {
                Some(r) => (true, r.version),
                None => (false, 0),
            };
            if exists != observed.exists || version != observed.version {
                *reason = "c2pl_validation_conflict".to_string();
                return false;
            }
        }

        for (key, record) in ctx.write_set() {
            let prior = storage.get(key);
            let mut to_store = record.clone();
            to_store.version = Record::next_version(prior.as_ref());
            storage.put(key, to_store);
        }
        true
    }

    fn after_txn(&self, txn_id: u64) {
        if let Some(keys) = self.held_by_txn.lock().remove(&txn_id) {
            self.locks.unlock_exclusive_many(&keys);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccbench_storage::InMemoryStorage;

    #[test]
    fn before_txn_locks_all_planned_keys() {
        let c2pl = C2pl::new();
        let keys = vec!["a".to_string(), "b".to_string()];
        let mut reason = String::new();
        assert!(c2pl.before_txn(1, &keys, &mut reason));
        assert!(!c2pl.locks.try_lock_exclusive("a"));
        assert!(!c2pl.locks.try_lock_exclusive("b"));
    }

    #[test]
    fn after_txn_releases_locks() {
        let c2pl = C2pl::new();
        let keys = vec!["a".to_string()];
        let mut reason = String::new();
        assert!(c2pl.before_txn(1, &keys, &mut reason));
        c2pl.after_txn(1);
        assert!(c2pl.locks.try_lock_exclusive("a"));
    }

    #[test]
    fn conflicting_key_sets_serialize_not_interleave() {
        let c2pl = C2pl::new();
        let keys = vec!["a".to_string(), "b".to_string()];
        let mut reason = String::new();
        assert!(c2pl.before_txn(1, &keys, &mut reason));
        assert!(!c2pl.before_txn(2, &keys, &mut reason));
        assert!(reason.contains("lock"));
    }

    #[test]
    fn commit_applies_writes_like_occ() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let c2pl = C2pl::new();
        let mut ctx = TransactionContext::new(storage.clone());
        ctx.write_int("k", "x", 5);
        let mut reason = String::new();
        assert!(c2pl.commit(&storage, &ctx, &mut reason));
        assert_eq!(storage.get("k").unwrap().get_int("x"), Some(5));
    }
}
