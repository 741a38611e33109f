use std::path::PathBuf;

/// Which `Storage` backend to construct for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    InMemory,
    File,
}

/// Which `CcStrategy` to construct for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcMode {
    NoCc,
    Occ,
    C2pl,
}

impl CcMode {
    pub fn name(&self) -> &'static str {
        match self {
            CcMode::NoCc => "no_cc",
            CcMode::Occ => "occ",
            CcMode::C2pl => "c2pl",
        }
    }
}

/// Everything a run needs, threaded from the CLI's flag parsing to the
/// driver. Constructed exclusively by the CLI layer — never parsed from
/// environment variables or a config file.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub workload_path: PathBuf,
    pub workload_name: String,
    pub storage_mode: StorageMode,
    pub db_path: Option<PathBuf>,
    pub cc_mode: CcMode,
    pub threads: usize,
    pub duration_s: u64,
    pub p_hot: f64,
    pub hotset_size: usize,
    pub seed: u64,
    pub max_retries: u32,
    pub backoff_us: u64,
    pub csv_path: Option<PathBuf>,
}
