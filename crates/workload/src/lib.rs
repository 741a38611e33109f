//! Key picker, transfer and TPC-C-mini workloads, and the input/workload
//! file parsers.

pub mod parse;
pub mod picker;
pub mod tpcc_mini;
pub mod transfer;
pub mod workload;

pub use picker::{KeyPicker, PickError};
pub use tpcc_mini::TpccMiniWorkload;
pub use transfer::TransferWorkload;
pub use workload::{TxnTemplate, Workload};
