//! Disk-backed [`mediadup_core::provider::FileInfoCache`] implementation:
//! a [`KeyedFsCache`] keyed by `(path, size, content_hash)`, gated by a
//! [`CacheMetadata`] sidecar so a config or schema change starts fresh
//! rather than silently mixing incompatible entries.

use std::path::{Path, PathBuf};

use mediadup_core::provider::{CacheKey, FileInfoCache as FileInfoCacheTrait};
use mediadup_core::FileInfo;

use crate::cache_metadata::CacheMetadata;
use crate::errors::FsCacheResult;
use crate::keyed_fs_cache::KeyedFsCache;

const DEFAULT_SAVE_THRESHOLD: u32 = 32;

pub struct FileInfoCache {
    inner: KeyedFsCache<CacheKey, FileInfo>,
}

impl FileInfoCache {
    pub fn open(cache_path: PathBuf, metadata: CacheMetadata) -> FsCacheResult<Self> {
        let sidecar_path = Self::sidecar_path(&cache_path);

        let stale = match CacheMetadata::load(&sidecar_path) {
            Ok(existing) => !existing.compatible_with(&metadata),
            Err(_) => true,
        };

        if stale && cache_path.exists() {
            let _ = std::fs::remove_file(&cache_path);
        }

        metadata.save(&sidecar_path)?;

        let inner = KeyedFsCache::new(DEFAULT_SAVE_THRESHOLD, cache_path)?;
        Ok(Self { inner })
    }

    fn sidecar_path(cache_path: &Path) -> PathBuf {
        let mut name = cache_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".metadata.txt");
        cache_path.with_file_name(name)
    }

    pub fn save(&self) -> FsCacheResult<()> {
        self.inner.save()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FileInfoCacheTrait for FileInfoCache {
    fn get(&self, key: &CacheKey) -> Option<FileInfo> {
        self.inner.get(key)
    }

    fn put(&self, key: CacheKey, value: FileInfo) {
        // A cache miss degrades to a recompute upstream; a failed write here
        // only loses the chance to persist this entry across runs.
        if let Err(e) = self.inner.insert(key, value) {
            log::warn!(target: "file_info_cache", "failed to persist cache entry: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mediadup_core::{FileStats, FrameInfo, MediaInfo, Metadata};

    fn tmp_cache_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mediadup_file_info_cache_test_{}_{}", std::process::id(), name))
    }

    fn sample_file_info() -> FileInfo {
        FileInfo {
            path: PathBuf::from("/tmp/a.jpg"),
            media: MediaInfo::new(vec![FrameInfo::new(vec![0u8; 8], 0.0)], 0.0),
            metadata: Metadata::default(),
            file_stats: FileStats {
                content_hash: "abc".into(),
                size: 123,
                created_at: None,
                modified_at: None,
            },
        }
    }

    #[test]
    fn test_put_then_get_roundtrips() {
        let path = tmp_cache_path("roundtrip.bin");
        let cache = FileInfoCache::open(path.clone(), CacheMetadata::current(32, 8)).unwrap();
        let key = CacheKey {
            path: PathBuf::from("/tmp/a.jpg"),
            size: 123,
            content_hash: "abc".into(),
        };
        cache.put(key.clone(), sample_file_info());
        assert!(cache.get(&key).is_some());
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(FileInfoCache::sidecar_path(&path));
    }

    #[test]
    fn test_incompatible_metadata_drops_old_cache() {
        let path = tmp_cache_path("stale.bin");
        {
            let cache = FileInfoCache::open(path.clone(), CacheMetadata::current(32, 8)).unwrap();
            let key = CacheKey {
                path: PathBuf::from("/tmp/a.jpg"),
                size: 123,
                content_hash: "abc".into(),
            };
            cache.put(key, sample_file_info());
            cache.save().unwrap();
        }

        let reopened = FileInfoCache::open(path.clone(), CacheMetadata::current(16, 8)).unwrap();
        assert!(reopened.is_empty());

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(FileInfoCache::sidecar_path(&path));
    }
}
