use std::fs;
use std::path::{Path, PathBuf};

use ccbench_core::{Error, Record, Result, Storage};

use crate::codec;
use crate::memory::InMemoryStorage;

/// A `Storage` that loads its table from a file on construction and can
/// write it back out on demand.
///
/// There is no write-ahead log and no fsync discipline: a crash between two
/// `flush` calls loses everything written since the last one. That is an
/// explicit non-goal (durability is out of scope) — this backend exists so
/// the CLI has a second, genuinely different `--storage` choice to exercise
/// without reaching for an external database dependency.
pub struct FileStorage {
    inner: InMemoryStorage,
    path: PathBuf,
}

impl FileStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = InMemoryStorage::new();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let rows = codec::decode_table(&content).map_err(|message| {
                Error::parse(path.to_string_lossy().to_string(), message)
            })?;
            for (key, record) in rows {
                inner.put(&key, record);
            }
        }
        Ok(FileStorage { inner, path })
    }

    pub fn flush(&self) -> Result<()> {
        let rows: Vec<(String, Record)> = self
            .inner
            .keys()
            .into_iter()
            .filter_map(|k| self.inner.get(&k).map(|r| (k, r)))
            .collect();
        let encoded = codec::encode_table(&rows);
        fs::write(&self.path, encoded)?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "flushed storage to disk");
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<Record> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, record: Record) {
        self.inner.put(key, record);
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}
