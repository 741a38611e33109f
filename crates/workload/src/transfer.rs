use std::sync::Arc;

use rand::RngCore;

use ccbench_concurrency::TransactionContext;
use ccbench_core::Error;

use crate::picker::KeyPicker;
use crate::workload::{has_prefix, TxnTemplate, Workload};

const ACCOUNT_PREFIX: &str = "A_";

struct TransferTemplate;

impl TxnTemplate for TransferTemplate {
    fn name(&self) -> &'static str {
        "transfer"
    }

    fn pick_keys(&self, picker: &KeyPicker, rng: &mut dyn RngCore) -> Option<Vec<String>> {
        picker
            .pick_by_prefix_distinct(ACCOUNT_PREFIX, 2, rng)
            .ok()
    }

    fn run(&self, ctx: &mut TransactionContext, keys: &[String]) -> bool {
        let (from, to) = (&keys[0], &keys[1]);
        if from == to {
            return false;
        }
        let from_balance = ctx.read_int(from, "balance", 0);
        let to_balance = ctx.read_int(to, "balance", 0);
        ctx.write_int(from, "balance", from_balance - 1);
        ctx.write_int(to, "balance", to_balance + 1);
        true
    }
}

/// Single-template workload: move one unit of `balance` between two
/// distinct `A_`-prefixed accounts.
pub struct TransferWorkload;

impl Workload for TransferWorkload {
    fn name(&self) -> &'static str {
        "w1"
    }

    fn templates(&self) -> Vec<Arc<dyn TxnTemplate>> {
        vec![Arc::new(TransferTemplate)]
    }

    fn prepare(&self, all_keys: &[String]) -> Result<(), Error> {
        if !has_prefix(all_keys, ACCOUNT_PREFIX) {
            return Err(Error::config(format!(
                "workload w1 requires at least one key with prefix {ACCOUNT_PREFIX:?}"
            )));
        }
        Ok(())
    }
}
