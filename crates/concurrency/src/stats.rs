/// Accumulated counters and latency samples for one worker, one template, or
/// the merged result of a whole run.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub committed: u64,
    pub aborted: u64,
    pub retries: u64,
    pub lock_conflicts: u64,
    pub validation_conflicts: u64,
    pub total_commit_latency_s: f64,
    /// Latency of committed attempts only.
    pub commit_latencies_s: Vec<f64>,
    /// Latency of every attempt's final outcome, committed or not.
    pub response_latencies_s: Vec<f64>,
}

impl Stats {
    pub fn new() -> Self {
        Stats::default()
    }

    pub fn record_commit(&mut self, latency_s: f64, retries: u64) {
        self.committed += 1;
        self.retries += retries;
        self.total_commit_latency_s += latency_s;
        self.commit_latencies_s.push(latency_s);
        self.response_latencies_s.push(latency_s);
    }

    pub fn record_abort(&mut self, latency_s: f64, retries: u64) {
        self.aborted += 1;
        self.retries += retries;
        self.response_latencies_s.push(latency_s);
    }

    pub fn record_lock_conflict(&mut self) {
        self.lock_conflicts += 1;
    }

    pub fn record_validation_conflict(&mut self) {
        self.validation_conflicts += 1;
    }

    /// Combine `other` into `self`: scalar counters add, latency vectors
    /// concatenate. Sample order carries no meaning, so merge order does
    /// not matter.
    pub fn merge(&mut self, other: &Stats) {
        self.committed += other.committed;
        self.aborted += other.aborted;
        self.retries += other.retries;
        self.lock_conflicts += other.lock_conflicts;
        self.validation_conflicts += other.validation_conflicts;
        self.total_commit_latency_s += other.total_commit_latency_s;
        self.commit_latencies_s
            .extend_from_slice(&other.commit_latencies_s);
        self.response_latencies_s
            .extend_from_slice(&other.response_latencies_s);
    }

    pub fn avg_commit_latency_s(&self) -> f64 {
        if self.committed == 0 {
            0.0
        } else {
            self.total_commit_latency_s / self.committed as f64
        }
    }

    pub fn avg_response_latency_s(&self) -> f64 {
        if self.response_latencies_s.is_empty() {
            0.0
        } else {
            self.response_latencies_s.iter().sum::<f64>() / self.response_latencies_s.len() as f64
        }
    }

    pub fn abort_rate(&self) -> f64 {
        let total = self.committed + self.aborted;
        if total == 0 {
            0.0
        } else {
            self.aborted as f64 / total as f64
        }
    }

    pub fn retries_per_commit(&self) -> f64 {
        if self.committed == 0 {
            0.0
        } else {
            self.retries as f64 / self.committed as f64
        }
    }

    pub fn response_percentile(&self, q: f64) -> f64 {
        percentile(&self.response_latencies_s, q)
    }
}

/// `floor(q * (n - 1))`-th order statistic of `values`. Empty input is 0.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let idx = ((q * (sorted.len() - 1) as f64).floor()) as usize;
    sorted[idx.min(sorted.len() - 1)]
}
