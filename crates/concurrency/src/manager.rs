use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;

use ccbench_core::Storage;

use crate::context::TransactionContext;
use crate::strategy::{CcStrategy, ConflictKind};

/// Outcome of `TransactionManager::execute` across all of its attempts.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteResult {
    pub committed: bool,
    pub retries: u64,
    pub lock_conflicts: u64,
    pub validation_conflicts: u64,
    pub latency_s: f64,
}

/// Binds a `CcStrategy` to a bounded, randomized-backoff retry loop.
///
/// One manager is shared across all worker threads for a run; `next_txn_id`
/// is the only state it owns beyond the strategy itself, and it is a plain
/// atomic counter, so `execute` requires no external synchronization.
pub struct TransactionManager {
    strategy: Arc<dyn CcStrategy>,
    storage: Arc<dyn Storage>,
    max_retries: u32,
    backoff_us: u64,
    next_txn_id: AtomicU64,
}

impl TransactionManager {
    pub fn new(
        strategy: Arc<dyn CcStrategy>,
        storage: Arc<dyn Storage>,
        max_retries: u32,
        backoff_us: u64,
    ) -> Self {
        TransactionManager {
            strategy,
            storage,
            max_retries,
            backoff_us,
            next_txn_id: AtomicU64::new(1),
        }
    }

    /// Run `body` to commit, retrying on conflict up to `max_retries`
    /// additional times with randomized backoff between attempts.
    ///
    /// `body` receives a fresh `TransactionContext` on every attempt and
    /// returns `false` to reject the transaction outright (a terminal,
    /// non-retryable outcome distinct from a CC conflict).
    pub fn execute(
        &self,
        mut body: impl FnMut(&mut TransactionContext) -> bool,
        planned_keys: &[String],
        rng: &mut impl Rng,
    ) -> ExecuteResult {
        let start = Instant::now();
        let mut lock_conflicts = 0u64;
        let mut validation_conflicts = 0u64;

        for attempt in 0..=self.max_retries {
            let txn_id = self.next_txn_id.fetch_add(1, Ordering::Relaxed);
            let mut reason = String::new();

            if !self.strategy.before_txn(txn_id, planned_keys, &mut reason) {
                self.tally_conflict(&reason, &mut lock_conflicts, &mut validation_conflicts);
                if attempt == self.max_retries {
                    return self.uncommitted(start, attempt, lock_conflicts, validation_conflicts);
                }
                self.backoff(attempt, rng);
                continue;
            }

            let mut ctx = TransactionContext::new(self.storage.clone());
            let accepted = body(&mut ctx);
            if !accepted {
                self.strategy.after_txn(txn_id);
                return self.uncommitted(start, attempt, lock_conflicts, validation_conflicts);
            }

            let committed = self.strategy.commit(&self.storage, &ctx, &mut reason);
            self.strategy.after_txn(txn_id);

            if committed {
                return ExecuteResult {
                    committed: true,
                    retries: attempt as u64,
                    lock_conflicts,
                    validation_conflicts,
                    latency_s: start.elapsed().as_secs_f64(),
                };
            }

            self.tally_conflict(&reason, &mut lock_conflicts, &mut validation_conflicts);
            if attempt == self.max_retries {
                return self.uncommitted(start, attempt, lock_conflicts, validation_conflicts);
            }
            self.backoff(attempt, rng);
        }

        unreachable!("loop always returns by the final attempt")
    }

    fn tally_conflict(&self, reason: &str, lock_conflicts: &mut u64, validation_conflicts: &mut u64) {
        match ConflictKind::classify(reason) {
            ConflictKind::Lock => *lock_conflicts += 1,
            ConflictKind::Validation => *validation_conflicts += 1,
            ConflictKind::Other => {}
        }
    }

    fn uncommitted(
        &self,
        start: Instant,
        attempt: u32,
        lock_conflicts: u64,
        validation_conflicts: u64,
    ) -> ExecuteResult {
        tracing::warn!(
            attempts = attempt + 1,
            lock_conflicts,
            validation_conflicts,
            "transaction exhausted retries without committing"
        );
        ExecuteResult {
            committed: false,
            retries: attempt as u64,
            lock_conflicts,
            validation_conflicts,
            latency_s: start.elapsed().as_secs_f64(),
        }
    }

    fn backoff(&self, attempt: u32, rng: &mut impl Rng) {
        if self.backoff_us == 0 {
            return;
        }
        let bound = self.backoff_us * (attempt as u64 + 1);
        let micros = rng.gen_range(0..bound);
        std::thread::sleep(Duration::from_micros(micros));
    }
}
