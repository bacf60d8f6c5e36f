//! A filesystem-backed cache keyed by an arbitrary serializable, hashable
//! key instead of a bare `PathBuf`. [`crate::FileInfoCache`] needs to key on
//! `(path, size, content_hash)` so a cache entry self-invalidates the
//! moment a file's bytes change, not just when its path is reused for
//! different content. On-disk format: a single bincode-serialized map,
//! flushed atomically via temp-file-then-rename once `cache_save_threshold`
//! inserts have accumulated.

use std::{
    collections::HashMap,
    hash::Hash,
    io::BufWriter,
    path::PathBuf,
    sync::atomic::{AtomicU32, Ordering::Relaxed},
};

use log::{info, trace};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{FsCacheErrorKind::*, FsCacheResult};

#[derive(Default)]
pub struct KeyedFsCache<K, T> {
    cache_save_threshold: u32,
    cache_modified_count: AtomicU32,
    cache_path: PathBuf,
    cache: RwLock<HashMap<K, T>>,
}

impl<K, T> KeyedFsCache<K, T>
where
    K: DeserializeOwned + Serialize + Send + Sync + Clone + Eq + Hash,
    T: DeserializeOwned + Serialize + Send + Sync + Clone,
{
    pub fn new(cache_save_threshold: u32, cache_path: PathBuf) -> FsCacheResult<Self> {
        let mut ret = Self {
            cache_save_threshold,
            cache_modified_count: AtomicU32::default(),
            cache_path,
            cache: RwLock::default(),
        };
        ret.load_from_disk()?;
        Ok(ret)
    }

    fn load_from_disk(&mut self) -> FsCacheResult<()> {
        if !self.cache_path.exists() {
            info!(target: "keyed_cache_startup", "Creating new cache file: {}.", self.cache_path.display());
            return Ok(());
        }

        let cache_file = std::fs::File::open(&self.cache_path).map_err(|e| CacheFileIo {
            src: e,
            path: self.cache_path.clone(),
        })?;
        let reader = std::io::BufReader::new(cache_file);
        let data: HashMap<K, T> = bincode::deserialize_from(reader).map_err(|e| Deserialization {
            src: format!("{e}"),
            path: self.cache_path.clone(),
        })?;

        trace!(target: "keyed_cache_startup", "Loaded cache. Path: {}, Entries: {}", self.cache_path.display(), data.len());
        self.cache = RwLock::new(data);
        Ok(())
    }

    pub fn save(&self) -> FsCacheResult<()> {
        if self.cache_modified_count.load(Relaxed) > 0 {
            self.save_inner()
        } else {
            Ok(())
        }
    }

    fn save_inner(&self) -> FsCacheResult<()> {
        if !self.cache_path.exists() {
            if let Some(parent) = self.cache_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CacheFileIo {
                    src: e,
                    path: self.cache_path.clone(),
                })?;
            }
        }

        let temp_path = self.cache_path.with_extension("tmp");
        info!(target: "keyed_cache_transactions", "saving updated cache at {} of size {}", self.cache_path.display(), self.len());

        let temp_file = std::fs::File::create(&temp_path).map_err(|e| CacheFileIo {
            src: e,
            path: self.cache_path.clone(),
        })?;
        let mut buf = BufWriter::new(temp_file);

        let readable = self.cache.read();
        bincode::serialize_into(&mut buf, &*readable).map_err(|e| Serialization {
            src: format!("{e}"),
            path: self.cache_path.clone(),
        })?;
        drop(readable);

        let temp_file = buf.into_inner().map_err(|e| CacheFileIo {
            src: e.into_error(),
            path: self.cache_path.clone(),
        })?;
        temp_file.sync_all().map_err(|e| CacheFileIo {
            src: e,
            path: self.cache_path.clone(),
        })?;

        std::fs::rename(temp_path, &self.cache_path).map_err(|e| CacheFileIo {
            src: e,
            path: self.cache_path.clone(),
        })
    }

    pub fn get(&self, key: &K) -> Option<T> {
        self.cache.read().get(key).cloned()
    }

    pub fn insert(&self, key: K, value: T) -> FsCacheResult<()> {
        let prev_count = self.cache_modified_count.fetch_add(1, Relaxed);
        {
            let mut writeable = self.cache.write();
            writeable.insert(key, value);
        }
        if prev_count == self.cache_save_threshold.saturating_sub(1) {
            self.cache_modified_count.store(0, Relaxed);
            self.save_inner()
        } else {
            Ok(())
        }
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
    struct Key(String);

    #[test]
    fn test_insert_then_get_roundtrips_in_memory() {
        let dir = std::env::temp_dir().join(format!("mediadup_keyed_cache_test_{}", std::process::id()));
        let cache: KeyedFsCache<Key, u32> = KeyedFsCache::new(1000, dir.join("cache.bin")).unwrap();
        cache.insert(Key("a".into()), 42).unwrap();
        assert_eq!(cache.get(&Key("a".into())), Some(42));
        assert_eq!(cache.get(&Key("b".into())), None);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
