use std::sync::Arc;

use ccbench_core::Storage;

use crate::context::TransactionContext;

/// What kind of conflict caused an attempt to fail, as classified from the
/// strategy's reason token. Neither substring is guaranteed unique to one
/// strategy — OCC and C2PL both surface `ConflictKind::Validation` from
/// `commit`, and only C2PL ever surfaces `ConflictKind::Lock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Lock,
    Validation,
    Other,
}

impl ConflictKind {
    pub fn classify(reason: &str) -> Self {
        if reason.contains("lock") {
            ConflictKind::Lock
        } else if reason.contains("validation") || reason.contains("version") {
            ConflictKind::Validation
        } else {
            ConflictKind::Other
        }
    }
}

/// A pluggable concurrency-control strategy.
///
/// Implementations must be safe to share across worker threads: the
/// transaction manager calls these methods concurrently from many threads,
/// each working on its own `txn_id` and `TransactionContext`.
pub trait CcStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Optional pre-hook run before the transaction body executes. Returning
    /// `false` aborts the attempt before the body runs; `reason` should then
    /// be populated with a token `ConflictKind::classify` can read.
    fn before_txn(&self, txn_id: u64, planned_keys: &[String], reason: &mut String) -> bool {
        let _ = (txn_id, planned_keys, reason);
        true
    }

    /// Validate (if applicable) and apply the context's write set to
    /// storage. Returning `false` aborts the attempt; `reason` should then
    /// be populated.
    fn commit(
        &self,
        storage: &Arc<dyn Storage>,
        ctx: &TransactionContext,
        reason: &mut String,
    ) -> bool;

    /// Release any resources acquired in `before_txn`. Must be idempotent
    /// and must be called exactly once per successful `before_txn`,
    /// regardless of how the attempt ended.
    fn after_txn(&self, txn_id: u64) {
        let _ = txn_id;
    }
}
