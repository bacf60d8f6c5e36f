//! The narrow trait contracts the orchestrator calls through. Concrete
//! implementations (filesystem walking, EXIF extraction, ffmpeg-backed
//! frame sampling, content hashing, the on-disk cache) live in
//! `mediadup_providers` and `mediadup_cache`; this crate only defines the
//! boundary so the numerical core never depends on I/O.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{FileInfo, FileStats, MediaInfo, Metadata};

/// Recursively discovers files under `roots`, grouped by lowercase
/// extension (without the leading dot).
pub trait DiscoverFiles {
    fn discover(&self, roots: &[PathBuf], concurrency: usize) -> Result<BTreeMap<String, Vec<PathBuf>>>;
}

/// Extracts EXIF-derived metadata from one file. Absence of EXIF data is
/// not an error: an empty [`Metadata`] is returned.
pub trait ExtractMetadata {
    fn extract_metadata(&self, path: &Path) -> Result<Metadata>;
}

/// Tunables for adaptive video frame sampling, and the single knob images
/// need (`resolution`, which every frame's luminance block is sized to
/// before hashing).
#[derive(Clone, Copy, Debug)]
pub struct FrameExtractionConfig {
    pub resolution: usize,
    pub target_fps: f64,
    pub min_frames: usize,
    pub max_scene_frames: usize,
    pub scene_change_threshold: f64,
}

impl Default for FrameExtractionConfig {
    fn default() -> Self {
        Self {
            resolution: 32,
            target_fps: 1.0,
            min_frames: 1,
            max_scene_frames: 64,
            scene_change_threshold: 0.3,
        }
    }
}

/// Produces the ordered [`MediaInfo`] (frame hashes + duration) for a file.
/// A video path samples frames at scene-change points subject to
/// `target_fps` and the `min_frames`/`max_scene_frames` floor/ceiling; an
/// image path produces exactly one frame at `t=0`.
pub trait ExtractFrames {
    fn extract_frames(&self, path: &Path, cfg: &FrameExtractionConfig) -> Result<MediaInfo>;
}

/// Computes content-addressed stats (chunked content hash, size, times) for
/// a file.
pub trait ComputeFileStats {
    fn compute_file_stats(&self, path: &Path, max_chunk_size: usize) -> Result<FileStats>;
}

/// Cache lookup key: a file is considered unchanged iff its path, size and
/// content hash are all unchanged from the cached entry.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct CacheKey {
    pub path: PathBuf,
    pub size: u64,
    pub content_hash: String,
}

/// The persistent artifact cache. `get`/`put` never block on anything other
/// than the in-memory map lock; disk I/O is batched by the implementation.
pub trait FileInfoCache {
    fn get(&self, key: &CacheKey) -> Option<FileInfo>;
    fn put(&self, key: CacheKey, value: FileInfo);
}
