use std::sync::Arc;

use rand::RngCore;

use ccbench_concurrency::TransactionContext;
use ccbench_core::Error;

use crate::picker::KeyPicker;
use crate::workload::{has_prefix, TxnTemplate, Workload};

const WAREHOUSE_PREFIX: &str = "W_";
const DISTRICT_PREFIX: &str = "D_";
const CUSTOMER_PREFIX: &str = "C_";
const STOCK_PREFIX: &str = "S_";

struct NewOrderTemplate;

impl TxnTemplate for NewOrderTemplate {
    fn name(&self) -> &'static str {
        "new_order"
    }

    fn pick_keys(&self, picker: &KeyPicker, rng: &mut dyn RngCore) -> Option<Vec<String>> {
        let district = picker.pick_by_prefix(DISTRICT_PREFIX, rng).ok()?;
        let stocks = picker
            .pick_by_prefix_distinct(STOCK_PREFIX, 3, rng)
            .ok()?;
        let mut keys = vec![district];
        keys.extend(stocks);
        Some(keys)
    }

    fn run(&self, ctx: &mut TransactionContext, keys: &[String]) -> bool {
        let district = &keys[0];
        let next_o_id = ctx.read_int(district, "next_o_id", 0);
        ctx.write_int(district, "next_o_id", next_o_id + 1);

        for stock in &keys[1..] {
            let qty = ctx.read_int(stock, "qty", 0);
            let ytd = ctx.read_int(stock, "ytd", 0);
            let order_cnt = ctx.read_int(stock, "order_cnt", 0);
            ctx.write_int(stock, "qty", qty - 1);
            ctx.write_int(stock, "ytd", ytd + 1);
            ctx.write_int(stock, "order_cnt", order_cnt + 1);
        }
        true
    }
}

struct PaymentTemplate;

impl TxnTemplate for PaymentTemplate {
    fn name(&self) -> &'static str {
        "payment"
    }

    fn pick_keys(&self, picker: &KeyPicker, rng: &mut dyn RngCore) -> Option<Vec<String>> {
        let warehouse = picker.pick_by_prefix(WAREHOUSE_PREFIX, rng).ok()?;
        let district = picker.pick_by_prefix(DISTRICT_PREFIX, rng).ok()?;
        let customer = picker.pick_by_prefix(CUSTOMER_PREFIX, rng).ok()?;
        Some(vec![warehouse, district, customer])
    }

    fn run(&self, ctx: &mut TransactionContext, keys: &[String]) -> bool {
        let (warehouse, district, customer) = (&keys[0], &keys[1], &keys[2]);

        let w_ytd = ctx.read_int(warehouse, "ytd", 0);
        ctx.write_int(warehouse, "ytd", w_ytd + 5);

        let d_ytd = ctx.read_int(district, "ytd", 0);
        ctx.write_int(district, "ytd", d_ytd + 5);

        let c_balance = ctx.read_int(customer, "balance", 0);
        let c_ytd_payment = ctx.read_int(customer, "ytd_payment", 0);
        let c_payment_cnt = ctx.read_int(customer, "payment_cnt", 0);
        ctx.write_int(customer, "balance", c_balance - 5);
        ctx.write_int(customer, "ytd_payment", c_ytd_payment + 5);
        ctx.write_int(customer, "payment_cnt", c_payment_cnt + 1);
        true
    }
}

/// Two-template workload loosely modeled on TPC-C's new-order and payment
/// transactions, scaled down to a handful of integer counters per entity.
pub struct TpccMiniWorkload;

impl Workload for TpccMiniWorkload {
    fn name(&self) -> &'static str {
        "w2"
    }

    fn templates(&self) -> Vec<Arc<dyn TxnTemplate>> {
        vec![Arc::new(NewOrderTemplate), Arc::new(PaymentTemplate)]
    }

    fn prepare(&self, all_keys: &[String]) -> Result<(), Error> {
        for prefix in [WAREHOUSE_PREFIX, DISTRICT_PREFIX, CUSTOMER_PREFIX, STOCK_PREFIX] {
            if !has_prefix(all_keys, prefix) {
                return Err(Error::config(format!(
                    "workload w2 requires at least one key with prefix {prefix:?}"
                )));
            }
        }
        Ok(())
    }
}
