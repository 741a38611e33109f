use std::sync::Arc;

use ccbench_core::{Record, Storage};

use crate::context::TransactionContext;
use crate::strategy::CcStrategy;

/// No concurrency control at all: writes are applied with no validation of
/// the read set. This is the unsafe baseline the benchmark uses to
/// demonstrate what contention does in the absence of any isolation.
pub struct NoCc;

impl CcStrategy for NoCc {
    fn name(&self) -> &'static str {
        "no_cc"
    }

    fn commit(
        &self,
        storage: &Arc<dyn Storage>,
        ctx: &TransactionContext,
        _reason: &mut String,
    ) -> bool {
        for (key, record) in ctx.write_set() {
            let prior = storage.get(key);
            let mut to_store = record.clone();
            to_store.version = Record::next_version(prior.as_ref());
            storage.put(key, to_store);
        }
        true
    }
}
