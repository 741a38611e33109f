//! Facade crate re-exporting the ccbench workspace members for integration
//! tests and benchmarks that want one `use` statement instead of five.

pub use ccbench_bench as bench;
pub use ccbench_concurrency as concurrency;
pub use ccbench_core as core;
pub use ccbench_storage as storage;
pub use ccbench_workload as workload;
