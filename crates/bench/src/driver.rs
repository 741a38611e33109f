use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use ccbench_concurrency::strategies::{C2pl, NoCc, Occ};
use ccbench_concurrency::{CcStrategy, Stats, TransactionManager};
use ccbench_core::Storage;
use ccbench_workload::{KeyPicker, TxnTemplate, Workload};

use crate::config::{CcMode, RunConfig};

/// Derives an independent-looking seed for `(base_seed, thread_index)` via a
/// splitmix64-style mix, so every worker gets a distinct but reproducible
/// stream from one run seed.
pub fn derive_thread_seed(base_seed: u64, thread_index: u64) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    base_seed ^ (GOLDEN_GAMMA
        .wrapping_add(thread_index)
        .wrapping_add(base_seed << 6)
        .wrapping_add(base_seed >> 2))
}

fn build_strategy(mode: CcMode) -> Arc<dyn CcStrategy> {
    match mode {
        CcMode::NoCc => Arc::new(NoCc),
        CcMode::Occ => Arc::new(Occ::new()),
        CcMode::C2pl => Arc::new(C2pl::new()),
    }
}

/// Result of one complete benchmark run.
pub struct RunResult {
    pub overall: Stats,
    pub per_template: FxHashMap<String, Stats>,
    pub wall_time_s: f64,
}

/// Runs `workload` against `storage` under the strategy named by
/// `config.cc_mode` for `config.duration_s` wall-clock seconds using
/// `config.threads` worker threads.
///
/// Each worker seeds its own RNG from `(config.seed, thread_index)`, picks a
/// template uniformly, asks the template for a key list, and drives it
/// through the shared `TransactionManager` until the stop flag is set.
/// Per-thread and per-template stats are accumulated thread-locally and
/// merged only after every worker has joined, so no synchronization beyond
/// the join and the stop flag is required.
pub fn run_benchmark(
    config: &RunConfig,
    storage: Arc<dyn Storage>,
    workload: Arc<dyn Workload>,
) -> RunResult {
    let templates = workload.templates();
    let picker = Arc::new(KeyPicker::new(storage.keys(), config.p_hot, config.hotset_size));
    let strategy = build_strategy(config.cc_mode);
    let manager = Arc::new(TransactionManager::new(
        strategy,
        storage.clone(),
        config.max_retries,
        config.backoff_us,
    ));

    let stop = Arc::new(AtomicBool::new(false));
    let start = Instant::now();

    let mut handles = Vec::with_capacity(config.threads);
    for thread_index in 0..config.threads {
        let manager = manager.clone();
        let picker = picker.clone();
        let templates: Vec<Arc<dyn TxnTemplate>> = templates.clone();
        let stop = stop.clone();
        let seed = derive_thread_seed(config.seed, thread_index as u64);

        handles.push(thread::spawn(move || {
            worker_loop(manager, picker, templates, stop, seed)
        }));
    }

    thread::sleep(Duration::from_secs(config.duration_s));
    stop.store(true, Ordering::Relaxed);

    let mut overall = Stats::new();
    let mut per_template: FxHashMap<String, Stats> = FxHashMap::default();
    for handle in handles {
        let (thread_overall, thread_per_template) = handle.join().expect("worker thread panicked");
        overall.merge(&thread_overall);
        for (name, stats) in thread_per_template {
            per_template.entry(name).or_default().merge(&stats);
        }
    }

    RunResult {
        overall,
        per_template,
        wall_time_s: start.elapsed().as_secs_f64(),
    }
}

fn worker_loop(
    manager: Arc<TransactionManager>,
    picker: Arc<KeyPicker>,
    templates: Vec<Arc<dyn TxnTemplate>>,
    stop: Arc<AtomicBool>,
    seed: u64,
) -> (Stats, FxHashMap<String, Stats>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut overall = Stats::new();
    let mut per_template: FxHashMap<String, Stats> = FxHashMap::default();

    while !stop.load(Ordering::Relaxed) {
        let template = &templates[rng.gen_range(0..templates.len())];
        let keys = match template.pick_keys(&picker, &mut rng) {
            Some(keys) => keys,
            None => {
                tracing::trace!(template = template.name(), "picker could not produce keys");
                continue;
            }
        };

        let result = manager.execute(|ctx| template.run(ctx, &keys), &keys, &mut rng);
        let entry = per_template.entry(template.name().to_string()).or_default();

        if result.committed {
            overall.record_commit(result.latency_s, result.retries);
            entry.record_commit(result.latency_s, result.retries);
        } else {
            overall.record_abort(result.latency_s, result.retries);
            entry.record_abort(result.latency_s, result.retries);
        }
        for _ in 0..result.lock_conflicts {
            overall.record_lock_conflict();
            entry.record_lock_conflict();
        }
        for _ in 0..result.validation_conflicts {
            overall.record_validation_conflict();
            entry.record_validation_conflict();
        }
    }

    (overall, per_template)
}
