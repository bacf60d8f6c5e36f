use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Finds perceptual near-duplicates across images and videos.
///
/// Scans `roots` recursively, perceptually hashes every file found, clusters
/// near-duplicates, and reports a best representative per cluster. Bit-exact
/// file hashing alone is not enough here: a re-encode, resize, or transcode
/// changes every byte while leaving the picture (or the video's content)
/// effectively unchanged, which is exactly the case this tool is built for.
#[derive(Parser, Debug)]
#[command(name = "mediadup", version, about)]
pub struct Cli {
    /// Directories to scan for images and videos.
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,

    /// Maximum number of files processed concurrently (artifact extraction
    /// and I/O only — the numerical core is always run to completion
    /// per-call and never suspends).
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Physically move duplicate files (every non-representative member of
    /// a cluster) into the directory given by `--duplicate` instead of just
    /// reporting them there. Requires `--duplicate`.
    #[arg(long)]
    pub r#move: bool,

    /// Side length of the square luminance block each frame is downsized to
    /// before the DCT runs. Must be >= the internal hash size (8).
    #[arg(long, default_value_t = 32)]
    pub resolution: usize,

    /// Output format for the `--duplicate` and `--error` reports.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Number of files processed together in one clustering pass. Bounds
    /// memory on very large directory trees: only one window's files and
    /// their VP-tree live in memory at a time.
    #[arg(long, default_value_t = 2000)]
    pub window_size: usize,

    /// Files to advance between successive windows. Must be `<= window-size`;
    /// the remaining `window-size - step-size` files overlap with the next
    /// window so that duplicate pairs split across a window boundary are
    /// still clustered together.
    #[arg(long, default_value_t = 1000)]
    pub step_size: usize,

    /// Chunk size (bytes) used when computing each file's content hash.
    #[arg(long, default_value_t = 1 << 20)]
    pub max_chunk_size: usize,

    /// Floor on the number of frames kept per video after scene-change
    /// sampling; frames are backfilled evenly if scene detection keeps fewer.
    #[arg(long, default_value_t = 1)]
    pub min_frames: usize,

    /// Ceiling on the number of frames kept per video after scene-change
    /// sampling.
    #[arg(long, default_value_t = 64)]
    pub max_scene_frames: usize,

    /// Frames per second videos are decoded at before scene-change thinning.
    #[arg(long, default_value_t = 1.0)]
    pub target_fps: f64,

    /// Minimum normalized mean luma difference between consecutive decoded
    /// frames for the later one to count as a scene change.
    #[arg(long, default_value_t = 0.3)]
    pub scene_change_threshold: f64,

    /// Similarity threshold (0..=1) above which two still images are
    /// considered the same cluster.
    #[arg(long, default_value_t = 0.90)]
    pub image_similarity_threshold: f64,

    /// Similarity threshold (0..=1) above which a still image and a video
    /// are considered the same cluster.
    #[arg(long, default_value_t = 0.85)]
    pub image_video_similarity_threshold: f64,

    /// Similarity threshold (0..=1) above which two videos are considered
    /// the same cluster.
    #[arg(long, default_value_t = 0.80)]
    pub video_similarity_threshold: f64,

    /// Per-file timeout (seconds) bounding external-tool calls (EXIF/frame
    /// extraction). A file that times out is marked errored and excluded.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Path to the on-disk artifact cache. Defaults to `.mediadup-cache.bin`
    /// in the current directory.
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Write the list of files that failed processing here.
    #[arg(long)]
    pub error: Option<PathBuf>,

    /// Write the duplicate-cluster report here (or, with `--move`, the
    /// directory duplicate files are moved into).
    #[arg(long)]
    pub duplicate: Option<PathBuf>,

    /// Write a full debug dump (unique files, clusters, representatives,
    /// errors) here, always as JSON regardless of `--format`.
    #[arg(long)]
    pub debug: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Validates flag combinations that aren't expressible in `clap`'s
    /// declarative constraints. Configuration errors abort before any work
    /// starts, per the error-handling design (§7).
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("--concurrency must be >= 1".to_string());
        }
        if self.resolution < 8 {
            return Err("--resolution must be >= 8 (the internal hash size)".to_string());
        }
        if self.window_size == 0 {
            return Err("--window-size must be >= 1".to_string());
        }
        if self.step_size == 0 || self.step_size > self.window_size {
            return Err("--step-size must be >= 1 and <= --window-size".to_string());
        }
        if self.max_chunk_size == 0 {
            return Err("--max-chunk-size must be >= 1".to_string());
        }
        for (name, value) in [
            ("--image-similarity-threshold", self.image_similarity_threshold),
            ("--image-video-similarity-threshold", self.image_video_similarity_threshold),
            ("--video-similarity-threshold", self.video_similarity_threshold),
            ("--scene-change-threshold", self.scene_change_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within 0.0..=1.0"));
            }
        }
        if self.target_fps <= 0.0 {
            return Err("--target-fps must be > 0".to_string());
        }
        if self.r#move && self.duplicate.is_none() {
            return Err("--move requires --duplicate to name the destination directory".to_string());
        }
        for root in &self.roots {
            if !root.exists() {
                return Err(format!("root directory does not exist: {}", root.display()));
            }
        }
        Ok(())
    }
}
