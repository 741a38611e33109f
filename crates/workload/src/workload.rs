use ccbench_concurrency::TransactionContext;
use ccbench_core::Error;

use crate::picker::KeyPicker;

/// One named transaction shape within a workload: how to choose its key set
/// and how its body mutates the keys it was given.
///
/// `pick_keys` runs once per attempt sequence, *outside* any transaction
/// attempt, so the same key list is reused across retries of one logical
/// transaction — only the read/write sets inside `run` are attempt-local.
pub trait TxnTemplate: Send + Sync {
    fn name(&self) -> &'static str;

    fn pick_keys(&self, picker: &KeyPicker, rng: &mut dyn rand::RngCore) -> Option<Vec<String>>;

    fn run(&self, ctx: &mut TransactionContext, keys: &[String]) -> bool;
}

/// A named, ordered collection of transaction templates plus a prepare step
/// that checks the storage contains the key prefixes this workload expects.
pub trait Workload: Send + Sync {
    fn name(&self) -> &'static str;

    fn templates(&self) -> Vec<std::sync::Arc<dyn TxnTemplate>>;

    /// Fail fast if the storage was not bulk-loaded with the keys this
    /// workload's templates expect (identified by prefix).
    fn prepare(&self, all_keys: &[String]) -> Result<(), Error>;
}

pub(crate) fn has_prefix(all_keys: &[String], prefix: &str) -> bool {
    all_keys.iter().any(|k| k.starts_with(prefix))
}
