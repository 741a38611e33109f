use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use ccbench_core::{Error, Result};

use crate::config::{CcMode, RunConfig};
use crate::driver::RunResult;

const CSV_HEADER: &str = "row_type,template,workload,cc,threads,duration_s,p_hot,hotset_size,committed,aborted,retries,abort_rate,retry_per_commit,lock_conflicts,validation_conflicts,throughput_tps,avg_commit_latency_ms,avg_response_latency_ms,p50_response_ms,p95_response_ms,p99_response_ms,balance_before,balance_after";

struct CsvRow<'a> {
    row_type: &'static str,
    template: &'a str,
    config: &'a RunConfig,
    stats: &'a ccbench_concurrency::Stats,
    wall_time_s: f64,
    balance_before: i64,
    balance_after: i64,
}

impl<'a> CsvRow<'a> {
    fn format(&self) -> String {
        let throughput = if self.wall_time_s > 0.0 {
            self.stats.committed as f64 / self.wall_time_s
        } else {
            0.0
        };
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{:.6},{:.6},{},{},{:.2},{:.3},{:.3},{:.3},{:.3},{:.3},{},{}",
            self.row_type,
            self.template,
            self.config.workload_name,
            self.config.cc_mode.name(),
            self.config.threads,
            self.config.duration_s,
            self.config.p_hot,
            self.config.hotset_size,
            self.stats.committed,
            self.stats.aborted,
            self.stats.retries,
            self.stats.abort_rate(),
            self.stats.retries_per_commit(),
            self.stats.lock_conflicts,
            self.stats.validation_conflicts,
            throughput,
            self.stats.avg_commit_latency_s() * 1000.0,
            self.stats.avg_response_latency_s() * 1000.0,
            self.stats.response_percentile(0.50) * 1000.0,
            self.stats.response_percentile(0.95) * 1000.0,
            self.stats.response_percentile(0.99) * 1000.0,
            self.balance_before,
            self.balance_after,
        )
    }
}

/// Human-readable summary of a run, printed to stdout by the CLI.
pub fn format_report(
    config: &RunConfig,
    result: &RunResult,
    balance_before: i64,
    balance_after: i64,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "cc={} workload={} threads={} duration_s={} p_hot={} hotset_size={}\n",
        config.cc_mode.name(),
        config.workload_name,
        config.threads,
        config.duration_s,
        config.p_hot,
        config.hotset_size,
    ));
    out.push_str(&format!(
        "  committed={} aborted={} abort_rate={:.4} retries={} retries_per_commit={:.4}\n",
        result.overall.committed,
        result.overall.aborted,
        result.overall.abort_rate(),
        result.overall.retries,
        result.overall.retries_per_commit(),
    ));
    out.push_str(&format!(
        "  lock_conflicts={} validation_conflicts={}\n",
        result.overall.lock_conflicts, result.overall.validation_conflicts,
    ));
    let throughput = if result.wall_time_s > 0.0 {
        result.overall.committed as f64 / result.wall_time_s
    } else {
        0.0
    };
    out.push_str(&format!(
        "  throughput_tps={:.2} avg_commit_ms={:.3} avg_response_ms={:.3} p50_ms={:.3} p95_ms={:.3} p99_ms={:.3}\n",
        throughput,
        result.overall.avg_commit_latency_s() * 1000.0,
        result.overall.avg_response_latency_s() * 1000.0,
        result.overall.response_percentile(0.50) * 1000.0,
        result.overall.response_percentile(0.95) * 1000.0,
        result.overall.response_percentile(0.99) * 1000.0,
    ));
    out.push_str(&format!(
        "  balance_before={balance_before} balance_after={balance_after}\n"
    ));

    let mut names: Vec<&String> = result.per_template.keys().collect();
    names.sort();
    for name in names {
        let stats = &result.per_template[name];
        out.push_str(&format!(
            "  [{name}] committed={} aborted={} retries={}\n",
            stats.committed, stats.aborted, stats.retries
        ));
    }

    out
}

/// Appends one `overall` row and one `template` row per template to `path`
/// in CSV form, writing the header first if the file is new or empty.
pub fn write_csv(
    path: &Path,
    config: &RunConfig,
    result: &RunResult,
    balance_before: i64,
    balance_after: i64,
) -> Result<()> {
    let needs_header = !path.exists() || std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(Error::from)?;

    if needs_header {
        writeln!(file, "{CSV_HEADER}").map_err(Error::from)?;
    }

    let overall_row = CsvRow {
        row_type: "overall",
        template: "*",
        config,
        stats: &result.overall,
        wall_time_s: result.wall_time_s,
        balance_before,
        balance_after,
    };
    writeln!(file, "{}", overall_row.format()).map_err(Error::from)?;

    let mut names: Vec<&String> = result.per_template.keys().collect();
    names.sort();
    for name in names {
        let row = CsvRow {
            row_type: "template",
            template: name,
            config,
            stats: &result.per_template[name],
            wall_time_s: result.wall_time_s,
            balance_before,
            balance_after,
        };
        writeln!(file, "{}", row.format()).map_err(Error::from)?;
    }

    Ok(())
}
