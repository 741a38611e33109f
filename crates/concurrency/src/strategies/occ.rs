use std::sync::Arc;

use parking_lot::Mutex;

use ccbench_core::{Record, Storage};

use crate::context::TransactionContext;
use crate::strategy::CcStrategy;

/// Optimistic concurrency control: transactions read and write freely
/// through the context with no locking, then validate their read set and
/// apply their write set inside a single process-wide critical section.
///
/// The critical section is the linearization point: a commit that exits it
/// having applied its writes happened strictly before any commit that
/// enters it afterward.
pub struct Occ {
    commit_mu: Mutex<()>,
}

impl Default for Occ {
    fn default() -> Self {
        Occ::new()
    }
}

impl Occ {
    pub fn new() -> Self {
        Occ {
            commit_mu: Mutex::new(()),
        }
    }
}

impl CcStrategy for Occ {
    fn name(&self) -> &'static str {
        "occ"
    }

    fn commit(
        &self,
        storage: &Arc<dyn Storage>,
        ctx: &TransactionContext,
        reason: &mut String,
    ) -> bool {
        let _guard = self.commit_mu.lock();

        for (key, observed) in ctx.read_set() {
            let current = storage.get(key);
            let (exists, version) = match &current {
                Some(r) => (true, r.version),
                None => (false, 0),
            };
            if exists != observed.exists || version != observed.version {
                *reason = "occ_validation_conflict".to_string();
                tracing::debug!(key = %key, "occ validation conflict");
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccbench_storage::InMemoryStorage;

    #[test]
    fn commit_with_no_conflicting_reads_succeeds() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let occ = Occ::new();
        let mut ctx = TransactionContext::new(storage.clone());
        ctx.write_int("k", "x", 1);
        let mut reason = String::new();
        assert!(occ.commit(&storage, &ctx, &mut reason));
    }

    #[test]
    fn stale_read_set_aborts_with_validation_reason() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let occ = Occ::new();

        let mut r = Record::new(1);
        r.set_int("x", 1);
        storage.put("k", r);

        let mut ctx = TransactionContext::new(storage.clone());
        ctx.read_int("k", "x", 0); // captures version 1

        // concurrent writer bumps the version
        let mut r2 = Record::new(2);
        r2.set_int("x", 99);
        storage.put("k", r2);

        ctx.write_int("k", "x", 2);
        let mut reason = String::new();
        assert!(!occ.commit(&storage, &ctx, &mut reason));
        assert!(reason.contains("validation"));
    }

    #[test]
    fn read_of_absent_key_then_concurrent_insert_conflicts() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let occ = Occ::new();

        let mut ctx = TransactionContext::new(storage.clone());
        ctx.read_int("k", "x", 0); // captures absent

        storage.put("k", Record::new(1));

        ctx.write_int("k", "x", 1);
        let mut reason = String::new();
        assert!(!occ.commit(&storage, &ctx, &mut reason));
    }
}
