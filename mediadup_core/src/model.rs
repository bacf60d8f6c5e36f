//! The data model shared by every stage of the pipeline: frames, media,
//! metadata and file stats going in; clusters and the deduplication result
//! coming out.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single perceptually-hashed frame, plus the timestamp (seconds from the
/// start of the file) it was taken at. Images have exactly one frame, at
/// t=0.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct FrameInfo {
    pub hash: Vec<u8>,
    pub timestamp: f64,
}

impl FrameInfo {
    pub fn new(hash: Vec<u8>, timestamp: f64) -> Self {
        Self { hash, timestamp }
    }
}

/// The ordered sequence of hashed frames for one file, plus its duration.
/// `duration == 0.0` marks a still image.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct MediaInfo {
    pub frames: Vec<FrameInfo>,
    pub duration: f64,
}

impl MediaInfo {
    pub fn new(frames: Vec<FrameInfo>, duration: f64) -> Self {
        Self { frames, duration }
    }

    pub fn is_video(&self) -> bool {
        self.duration > 0.0
    }

    /// Number of bytes in each frame's hash. `0` if there are no frames.
    pub fn hash_bytes(&self) -> usize {
        self.frames.first().map_or(0, |f| f.hash.len())
    }
}

/// EXIF-derived metadata. Every field is optional except the dimensions,
/// which default to 0 when unknown.
#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub width: u32,
    pub height: u32,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
    pub camera_model: Option<String>,
    pub image_date: Option<String>,
}

impl Metadata {
    pub fn has_gps(&self) -> bool {
        self.gps_latitude.is_some() && self.gps_longitude.is_some()
    }

    pub fn completeness_score(&self) -> f64 {
        let mut score = 0.0;
        if self.image_date.is_some() {
            score += 2000.0;
        }
        if self.has_gps() {
            score += 300.0;
        }
        if self.camera_model.is_some() {
            score += 200.0;
        }
        score
    }
}

/// Content-addressed stats about the file on disk.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct FileStats {
    pub content_hash: String,
    pub size: u64,
    pub created_at: Option<i64>,
    pub modified_at: Option<i64>,
}

/// Everything known about one discovered file: its media (frame hashes +
/// duration), its EXIF metadata, and its on-disk stats. This is the unit the
/// cache stores and the unit the clustering stages operate over.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub media: MediaInfo,
    pub metadata: Metadata,
    pub file_stats: FileStats,
}

impl FileInfo {
    pub fn score(&self) -> f64 {
        let mut score = 0.0;

        if self.media.is_video() {
            score += 10_000.0;
        }
        score += 100.0 * (1.0f64.max(self.media.duration + 1.0)).ln();
        score += self.metadata.completeness_score();

        let (w, h) = (f64::from(self.metadata.width), f64::from(self.metadata.height));
        if w > 0.0 && h > 0.0 {
            score += (w * h).sqrt();
        }

        score += 5.0 * ((self.file_stats.size as f64) + 1.0).ln();

        score
    }
}

/// A cluster of near-duplicate files: a representative set (always
/// including the best file) and the remaining duplicates.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Cluster {
    pub best_file: PathBuf,
    pub representatives: Vec<PathBuf>,
    pub duplicates: BTreeSet<PathBuf>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.representatives.len() + self.duplicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &PathBuf) -> bool {
        self.representatives.contains(path) || self.duplicates.contains(path)
    }
}

/// The terminal output of the pipeline.
#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct DeduplicationResult {
    pub unique_files: BTreeSet<PathBuf>,
    pub duplicate_sets: Vec<Cluster>,
}

impl DeduplicationResult {
    /// Sorts `duplicate_sets` by descending cluster size, then by
    /// `best_file` path, so that output is deterministic regardless of
    /// discovery order.
    pub fn sort(&mut self) {
        self.duplicate_sets
            .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.best_file.cmp(&b.best_file)));
    }
}
