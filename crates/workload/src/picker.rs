use rand::{Rng, RngCore};
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickError {
    #[error("requested {requested} distinct keys but only {available} are eligible")]
    NotEnoughKeys { requested: usize, available: usize },
    #[error("no keys with prefix {prefix:?}")]
    EmptyPrefix { prefix: String },
}

/// The prefix of a key is the substring up to and including the first `_`,
/// or the whole key if it contains no `_`. `A_1` and `A_2` share prefix
/// `A_`; a key with no underscore is its own singleton prefix bucket.
pub fn prefix_of(key: &str) -> &str {
    match key.find('_') {
        Some(idx) => &key[..=idx],
        None => key,
    }
}

/// Hot/cold and prefix-constrained uniform sampling over a fixed key
/// universe, used to shape contention in a workload run.
///
/// The hot set is the first `min(hotset_size, len(all_keys))` entries of the
/// *sorted* key list — sorting makes the hot set deterministic given the
/// same storage contents, independent of enumeration order.
pub struct KeyPicker {
    all_keys: Vec<String>,
    hot_keys: Vec<String>,
    p_hot: f64,
    prefix_all: FxHashMap<String, Vec<String>>,
    prefix_hot: FxHashMap<String, Vec<String>>,
}

impl KeyPicker {
    pub fn new(mut all_keys: Vec<String>, p_hot: f64, hotset_size: usize) -> Self {
        all_keys.sort();
        let hot_len = hotset_size.min(all_keys.len());
        let hot_keys: Vec<String> = all_keys[..hot_len].to_vec();

        let mut prefix_all: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for k in &all_keys {
            prefix_all
                .entry(prefix_of(k).to_string())
                .or_default()
                .push(k.clone());
        }
        let mut prefix_hot: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for k in &hot_keys {
            prefix_hot
                .entry(prefix_of(k).to_string())
                .or_default()
                .push(k.clone());
        }

        KeyPicker {
            all_keys,
            hot_keys,
            p_hot,
            prefix_all,
            prefix_hot,
        }
    }

    fn use_hot(&self, rng: &mut dyn RngCore) -> bool {
        !self.hot_keys.is_empty() && self.p_hot > 0.0 && rng.gen_bool(self.p_hot.min(1.0))
    }

    pub fn pick_any(&self, rng: &mut dyn RngCore) -> Option<String> {
        let pool = if self.use_hot(rng) {
            &self.hot_keys
        } else {
            &self.all_keys
        };
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.gen_range(0..pool.len())].clone())
    }

    pub fn pick_any_distinct(
        &self,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<String>, PickError> {
        if self.all_keys.len() < n {
            return Err(PickError::NotEnoughKeys {
                requested: n,
                available: self.all_keys.len(),
            });
        }
        let mut picked = Vec::with_capacity(n);
        while picked.len() < n {
            if let Some(k) = self.pick_any(rng) {
                if !picked.contains(&k) {
                    picked.push(k);
                }
            }
        }
        Ok(picked)
    }

    pub fn pick_by_prefix(&self, prefix: &str, rng: &mut dyn RngCore) -> Result<String, PickError> {
        let all_for_prefix = self.prefix_all.get(prefix);
        let Some(all_for_prefix) = all_for_prefix else {
            return Err(PickError::EmptyPrefix {
                prefix: prefix.to_string(),
            });
        };
        let hot_for_prefix = self.prefix_hot.get(prefix);
        let use_hot = hot_for_prefix.map(|h| !h.is_empty()).unwrap_or(false)
            && self.p_hot > 0.0
            && rng.gen_bool(self.p_hot.min(1.0));
        let pool = if use_hot {
            hot_for_prefix.unwrap()
        } else {
            all_for_prefix
        };
        Ok(pool[rng.gen_range(0..pool.len())].clone())
    }

    pub fn pick_by_prefix_distinct(
        &self,
        prefix: &str,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<String>, PickError> {
        let all_for_prefix = self
            .prefix_all
            .get(prefix)
            .ok_or_else(|| PickError::EmptyPrefix {
                prefix: prefix.to_string(),
            })?;
        if all_for_prefix.len() < n {
            return Err(PickError::NotEnoughKeys {
                requested: n,
                available: all_for_prefix.len(),
            });
        }
        let mut picked = Vec::with_capacity(n);
        while picked.len() < n {
            let k = self.pick_by_prefix(prefix, rng)?;
            if !picked.contains(&k) {
                picked.push(k);
            }
        }
        Ok(picked)
    }
}
