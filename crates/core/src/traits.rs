use crate::record::Record;

/// Uniform point-access interface over a keyed record table.
///
/// Implementations must provide per-key atomicity for `get`/`put`; no
/// multi-key atomicity is required or assumed by callers. `keys` need not be
/// a consistent snapshot with respect to concurrent writers — the benchmark
/// driver only relies on it to construct a hot set before a run starts, not
/// during steady-state contention.
pub trait Storage: Send + Sync {
    /// Point lookup. `None` iff no write has ever been applied to `key`.
    fn get(&self, key: &str) -> Option<Record>;

    /// Unconditional write. The caller supplies the version it wants
    /// persisted; `Storage` does not compute or validate versions itself.
    fn put(&self, key: &str, record: Record);

    /// Sorted, deduplicated list of all keys with a present record.
    fn keys(&self) -> Vec<String>;

    /// Sum of `field` across every present record, treating a missing or
    /// non-integer field as 0. Used by invariant checks (e.g. balance
    /// conservation), not by the transactional hot path.
    fn sum_int_field(&self, field: &str) -> i64 {
        self.keys()
            .iter()
            .filter_map(|k| self.get(k))
            .map(|r| r.get_int(field).unwrap_or(0))
            .sum()
    }

    /// Batch initialization. Records are inserted with `version = 0`,
    /// marking them as not yet touched by a transactional write.
    fn bulk_load(&self, items: Vec<(String, Record)>) {
        for (key, mut record) in items {
            record.version = 0;
            self.put(&key, record);
        }
    }
}
