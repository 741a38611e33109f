//! Run configuration, the multi-threaded benchmark driver, and the
//! report/CSV writer.

pub mod config;
pub mod driver;
pub mod report;

pub use config::{CcMode, RunConfig, StorageMode};
pub use driver::{derive_thread_seed, run_benchmark, RunResult};
pub use report::{format_report, write_csv};
