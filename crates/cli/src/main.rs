use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use ccbench_bench::{format_report, run_benchmark, write_csv, CcMode, RunConfig, StorageMode};
use ccbench_core::{Error, Result, Storage};
use ccbench_storage::{FileStorage, InMemoryStorage};
use ccbench_workload::parse::{check_template_count, parse_input_file, parse_workload_file};
use ccbench_workload::{TpccMiniWorkload, TransferWorkload, Workload};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WorkloadNameArg {
    W1,
    W2,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StorageArg {
    Inmem,
    File,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CcArg {
    NoCc,
    Occ,
    C2pl,
}

/// Benchmark harness comparing concurrency-control strategies over a shared
/// in-memory record store.
#[derive(Debug, Parser)]
#[command(name = "ccbench", version, about)]
struct Cli {
    /// Path to the bulk-load input file (INSERT / KEY / VALUE / END grammar).
    #[arg(long)]
    input: PathBuf,

    /// Path to the workload description file (WORKLOAD / TRANSACTION / END grammar).
    #[arg(long)]
    workload: PathBuf,

    /// Which compiled-in workload to run; must match the workload file's arity check.
    #[arg(long, value_enum)]
    workload_name: WorkloadNameArg,

    /// Storage backend to run against.
    #[arg(long, value_enum, default_value = "inmem")]
    storage: StorageArg,

    /// Path to the on-disk table file when `--storage file` is selected.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Concurrency-control strategy under test.
    #[arg(long, value_enum)]
    cc: CcArg,

    /// Number of worker threads.
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Wall-clock run length in seconds.
    #[arg(long, default_value_t = 5)]
    duration: u64,

    /// Probability of sampling from the hot key set.
    #[arg(long, default_value_t = 0.8)]
    p_hot: f64,

    /// Number of keys (from the sorted key list) in the hot set.
    #[arg(long, default_value_t = 10)]
    hotset_size: usize,

    /// Base RNG seed; each worker derives its own stream from this.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Maximum number of retries per transaction after the first attempt.
    #[arg(long, default_value_t = 10)]
    max_retries: u32,

    /// Backoff scale in microseconds; 0 disables backoff sleeping.
    #[arg(long, default_value_t = 100)]
    backoff_us: u64,

    /// Append-mode CSV output path.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn build_config(cli: &Cli) -> RunConfig {
    RunConfig {
        input_path: cli.input.clone(),
        workload_path: cli.workload.clone(),
        workload_name: match cli.workload_name {
            WorkloadNameArg::W1 => "w1".to_string(),
            WorkloadNameArg::W2 => "w2".to_string(),
        },
        storage_mode: match cli.storage {
            StorageArg::Inmem => StorageMode::InMemory,
            StorageArg::File => StorageMode::File,
        },
        db_path: cli.db_path.clone(),
        cc_mode: match cli.cc {
            CcArg::NoCc => CcMode::NoCc,
            CcArg::Occ => CcMode::Occ,
            CcArg::C2pl => CcMode::C2pl,
        },
        threads: cli.threads,
        duration_s: cli.duration,
        p_hot: cli.p_hot,
        hotset_size: cli.hotset_size,
        seed: cli.seed,
        max_retries: cli.max_retries,
        backoff_us: cli.backoff_us,
        csv_path: cli.csv.clone(),
    }
}

enum StorageHandle {
    InMemory(Arc<InMemoryStorage>),
    File(Arc<FileStorage>),
}

impl StorageHandle {
    fn open(config: &RunConfig) -> Result<Self> {
        match config.storage_mode {
            StorageMode::InMemory => Ok(StorageHandle::InMemory(Arc::new(InMemoryStorage::new()))),
            StorageMode::File => {
                let path = config
                    .db_path
                    .clone()
                    .ok_or_else(|| Error::config("--db_path is required when --storage file is selected"))?;
                Ok(StorageHandle::File(Arc::new(FileStorage::open(path)?)))
            }
        }
    }

    fn as_storage(&self) -> Arc<dyn Storage> {
        match self {
            StorageHandle::InMemory(s) => s.clone(),
            StorageHandle::File(s) => s.clone(),
        }
    }

    fn flush(&self) -> Result<()> {
        match self {
            StorageHandle::InMemory(_) => Ok(()),
            StorageHandle::File(s) => s.flush(),
        }
    }
}

fn build_workload(name: &str) -> Result<Arc<dyn Workload>> {
    match name {
        "w1" => Ok(Arc::new(TransferWorkload)),
        "w2" => Ok(Arc::new(TpccMiniWorkload)),
        other => Err(Error::config(format!("unknown workload name {other:?}"))),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli);

    let input_content = std::fs::read_to_string(&config.input_path)?;
    let rows = parse_input_file(&config.input_path.to_string_lossy(), &input_content)?;

    let workload_content = std::fs::read_to_string(&config.workload_path)?;
    let workload_spec =
        parse_workload_file(&config.workload_path.to_string_lossy(), &workload_content)?;
    check_template_count(&workload_spec, &config.workload_name)?;

    let storage_handle = StorageHandle::open(&config)?;
    let storage = storage_handle.as_storage();
    storage.bulk_load(rows);

    let workload = build_workload(&config.workload_name)?;
    workload
        .prepare(&storage.keys())
        .map_err(|e| Error::config(e.to_string()))?;

    let balance_before = storage.sum_int_field("balance");
    let result = run_benchmark(&config, storage.clone(), workload);
    let balance_after = storage.sum_int_field("balance");

    storage_handle.flush()?;

    println!("{}", format_report(&config, &result, balance_before, balance_after));

    if let Some(csv_path) = &config.csv_path {
        write_csv(csv_path, &config, &result, balance_before, balance_after)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}
