//! Version sidecar written next to a cache file, so that a change to the
//! hashing algorithm, frame-extraction config, or on-disk schema
//! invalidates old caches instead of silently deserializing stale data into
//! a shape it no longer matches.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{FsCacheErrorKind, FsCacheResult};

/// Bump whenever [`crate::FileInfoCache`]'s on-disk format, the hashing
/// algorithm, or the default [`mediadup_core::provider::FrameExtractionConfig`]
/// changes in a way that makes previously cached entries unsafe to reuse.
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub cache_version: u32,
    pub hash_resolution: usize,
    pub hash_size: usize,
}

impl CacheMetadata {
    pub fn current(hash_resolution: usize, hash_size: usize) -> Self {
        Self {
            cache_version: CACHE_VERSION,
            hash_resolution,
            hash_size,
        }
    }

    fn to_disk_fmt(&self) -> String {
        format!(
            "cache_version={}\nhash_resolution={}\nhash_size={}\n",
            self.cache_version, self.hash_resolution, self.hash_size
        )
    }

    fn try_parse(text: &str) -> FsCacheResult<Self> {
        let mut cache_version = None;
        let mut hash_resolution = None;
        let mut hash_size = None;

        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key {
                "cache_version" => cache_version = value.parse().ok(),
                "hash_resolution" => hash_resolution = value.parse().ok(),
                "hash_size" => hash_size = value.parse().ok(),
                _ => {}
            }
        }

        match (cache_version, hash_resolution, hash_size) {
            (Some(cache_version), Some(hash_resolution), Some(hash_size)) => Ok(Self {
                cache_version,
                hash_resolution,
                hash_size,
            }),
            _ => Err(FsCacheErrorKind::Deserialization {
                src: "malformed cache metadata sidecar".to_string(),
                path: std::path::PathBuf::new(),
            }),
        }
    }

    /// Returns `true` if `self` can safely serve cached entries written
    /// under `other`'s configuration.
    pub fn compatible_with(&self, other: &Self) -> bool {
        self == other
    }

    pub fn save(&self, sidecar_path: &Path) -> FsCacheResult<()> {
        std::fs::write(sidecar_path, self.to_disk_fmt()).map_err(|e| FsCacheErrorKind::CacheFileIo {
            src: e,
            path: sidecar_path.to_path_buf(),
        })
    }

    pub fn load(sidecar_path: &Path) -> FsCacheResult<Self> {
        let text = std::fs::read_to_string(sidecar_path).map_err(|e| FsCacheErrorKind::CacheFileIo {
            src: e,
            path: sidecar_path.to_path_buf(),
        })?;
        Self::try_parse(&text)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_roundtrip_through_disk_fmt() {
        let meta = CacheMetadata::current(32, 8);
        let parsed = CacheMetadata::try_parse(&meta.to_disk_fmt()).unwrap();
        assert_eq!(meta, parsed);
    }

    #[test]
    fn test_differing_hash_size_is_incompatible() {
        let a = CacheMetadata::current(32, 8);
        let b = CacheMetadata::current(32, 16);
        assert!(!a.compatible_with(&b));
    }

    #[test]
    fn test_malformed_sidecar_fails_to_parse() {
        assert!(CacheMetadata::try_parse("garbage").is_err());
    }
}
