//! Durable key-value stores the ledger persists its document into.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{EngineError, ResultEngine};

/// A key-value store holding one serialized document per key.
pub trait Storage {
    /// Raw bytes stored under `key`, `None` when nothing was ever saved.
    fn load(&self, key: &str) -> ResultEngine<Option<Vec<u8>>>;

    /// Replaces the value under `key`. Fails with
    /// [`EngineError::StorageQuota`] when the store is full.
    fn save(&mut self, key: &str, value: &[u8]) -> ResultEngine<()>;

    fn remove(&mut self, key: &str) -> ResultEngine<()>;

    /// Size in bytes of the value under `key`.
    fn size(&self, key: &str) -> ResultEngine<Option<u64>>;
}

fn check_quota(quota: Option<u64>, key: &str, len: usize) -> ResultEngine<()> {
    match quota {
        Some(quota) if len as u64 > quota => Err(EngineError::StorageQuota(format!(
            "{key} needs {len} bytes, quota is {quota}"
        ))),
        _ => Ok(()),
    }
}

/// Stores every key as `<key>.json` inside a directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<u64>,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
        }
    }

    /// Rejects any value larger than `bytes`.
    #[must_use]
    pub fn quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> ResultEngine<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &str, value: &[u8]) -> ResultEngine<()> {
        check_quota(self.quota, key, value.len())?;
        fs::create_dir_all(&self.dir)?;

        // Write aside and rename so a failed write never truncates the
        // previous document.
        let path = self.path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let written = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path));
        match written {
            Ok(()) => Ok(()),
            Err(err) => {
                let _ = fs::remove_file(&tmp);
                if err.kind() == ErrorKind::StorageFull {
                    Err(EngineError::StorageQuota(err.to_string()))
                } else {
                    Err(err.into())
                }
            }
        }
    }

    fn remove(&mut self, key: &str) -> ResultEngine<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn size(&self, key: &str) -> ResultEngine<Option<u64>> {
        match fs::metadata(self.path(key)) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store, mostly for tests.
///
/// Writes can be made to fail on demand to exercise the ledger's behaviour
/// when persistence is unavailable.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, Vec<u8>>,
    quota: Option<u64>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `value` under `key`.
    pub fn with_entry(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let mut storage = Self::default();
        storage.entries.insert(key.into(), value.into());
        storage
    }

    #[must_use]
    pub fn quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn set_quota(&mut self, bytes: Option<u64>) {
        self.quota = bytes;
    }

    /// Makes every following `save` fail with [`EngineError::Storage`].
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> ResultEngine<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &[u8]) -> ResultEngine<()> {
        if self.fail_writes {
            return Err(EngineError::Storage(format!("write of {key} refused")));
        }
        check_quota(self.quota, key, value.len())?;
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ResultEngine<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn size(&self, key: &str) -> ResultEngine<Option<u64>> {
        Ok(self.entries.get(key).map(|value| value.len() as u64))
    }
}
