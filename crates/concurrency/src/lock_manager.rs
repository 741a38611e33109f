use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// A table of per-key exclusive-hold counts.
///
/// Counts are 0 or 1 in the strategies this crate ships (`C2PL` is the only
/// caller), but the table stores a count rather than a boolean so a future
/// shared/intent-lock mode could reuse it without an API change.
#[derive(Default)]
pub struct LockManager {
    held: Mutex<FxHashMap<String, u32>>,
}

impl LockManager {
    pub fn new() -> Self {
        LockManager {
            held: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn try_lock_exclusive(&self, key: &str) -> bool {
        let mut held = self.held.lock();
        if held.get(key).copied().unwrap_or(0) > 0 {
            return false;
        }
        held.insert(key.to_string(), 1);
        true
    }

    /// Atomically acquire every key in `keys`, or none of them.
    ///
    /// The input is sorted and deduplicated before acquisition so that two
    /// overlapping key sets are always examined/acquired in the same order,
    /// which is what makes this non-blocking strategy deadlock-free: there
    /// is never a moment where one attempt holds a strict subset of another
    /// attempt's planned keys.
    pub fn try_lock_exclusive_many(&self, keys: &[String]) -> bool {
        let mut sorted: Vec<String> = keys.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut held = self.held.lock();
        if sorted
            .iter()
            .any(|k| held.get(k.as_str()).copied().unwrap_or(0) > 0)
        {
            return false;
        }
        for k in &sorted {
            held.insert(k.clone(), 1);
        }
        true
    }

    pub fn unlock_exclusive(&self, key: &str) {
        let mut held = self.held.lock();
        if let Some(count) = held.get_mut(key) {
            if *count > 0 {
                *count -= 1;
            }
            if *count == 0 {
                held.remove(key);
            }
        }
    }

    pub fn unlock_exclusive_many(&self, keys: &[String]) {
        for k in keys {
            self.unlock_exclusive(k);
        }
    }

    #[cfg(test)]
    pub fn is_locked(&self, key: &str) -> bool {
        self.held.lock().get(key).copied().unwrap_or(0) > 0
    }
}
