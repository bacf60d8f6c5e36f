//! [`mediadup_core::provider::ExtractFrames`] backed by [`mediadup_ffmpeg`]
//! for videos (adaptive scene-change sampling) and the `image` crate for
//! stills (a single frame at `t=0`). Every sampled frame is square-resized
//! and perceptually hashed with [`mediadup_core::dct_hasher::DctHasher`], so
//! callers never see raw pixels, only [`MediaInfo`].

use std::path::Path;

use image::GrayImage;
use mediadup_core::dct_hasher::DctHasher;
use mediadup_core::error::Error;
use mediadup_core::provider::{ExtractFrames, FrameExtractionConfig};
use mediadup_core::{FrameInfo, MediaInfo, Result};
use mediadup_ffmpeg::scene_sample::{sample_scene_frames, SceneSampleConfig};
use mediadup_ffmpeg::is_video_file;
use mediadup_imgops::frame_to_hash_input;

/// The number of low-frequency DCT bits retained per hash. Fixed
/// independently of `resolution` (which only sizes the luminance block the
/// DCT runs over): every frame a given extractor instance produces shares
/// `hash_size`, which is what the cache's version sidecar pins against.
const DEFAULT_HASH_SIZE: usize = 8;

pub struct FfmpegFrameExtractor {
    hash_size: usize,
}

impl FfmpegFrameExtractor {
    pub fn new() -> Self {
        Self { hash_size: DEFAULT_HASH_SIZE }
    }

    pub fn with_hash_size(hash_size: usize) -> Self {
        Self { hash_size }
    }

    fn hasher(&self, resolution: usize) -> Result<DctHasher> {
        DctHasher::new(resolution, self.hash_size)
    }

    fn hash_gray(&self, hasher: &DctHasher, resolution: u32, frame: &GrayImage) -> Result<Vec<u8>> {
        let input = frame_to_hash_input(frame, resolution);
        hasher.hash(&input)
    }

    fn extract_video(&self, path: &Path, cfg: &FrameExtractionConfig) -> Result<MediaInfo> {
        let hasher = self.hasher(cfg.resolution)?;

        let scene_cfg = SceneSampleConfig {
            resolution: cfg.resolution as u32,
            target_fps: cfg.target_fps,
            min_frames: cfg.min_frames,
            max_scene_frames: cfg.max_scene_frames,
            scene_change_threshold: cfg.scene_change_threshold,
        };

        let (sampled, info) = sample_scene_frames(path, &scene_cfg).map_err(|e| {
            Error::external_tool("extract_frames", "ffmpeg", e.to_string())
        })?;

        let mut frames = Vec::with_capacity(sampled.len());
        for frame in &sampled {
            let hash = self.hash_gray(&hasher, cfg.resolution as u32, &frame.image)?;
            frames.push(FrameInfo::new(hash, frame.timestamp));
        }

        Ok(MediaInfo::new(frames, info.duration().as_secs_f64()))
    }

    fn extract_image(&self, path: &Path, cfg: &FrameExtractionConfig) -> Result<MediaInfo> {
        let hasher = self.hasher(cfg.resolution)?;

        let decoded = image::open(path)
            .map_err(|e| Error::hashing("extract_frames", format!("{}: {e}", path.display())))?;
        let gray = decoded.to_luma8();
        let hash = self.hash_gray(&hasher, cfg.resolution as u32, &gray)?;

        Ok(MediaInfo::new(vec![FrameInfo::new(hash, 0.0)], 0.0))
    }
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractFrames for FfmpegFrameExtractor {
    fn extract_frames(&self, path: &Path, cfg: &FrameExtractionConfig) -> Result<MediaInfo> {
        let looks_like_video = is_video_file(path).unwrap_or(false);

        if looks_like_video {
            self.extract_video(path, cfg)
        } else {
            self.extract_image(path, cfg)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_still_image_hashes_to_single_frame_at_zero() {
        let path = std::env::temp_dir().join(format!("mediadup_frames_test_{}.png", std::process::id()));
        let img = GrayImage::from_pixel(64, 64, image::Luma([100]));
        img.save(&path).unwrap();

        let extractor = FfmpegFrameExtractor::new();
        let cfg = FrameExtractionConfig::default();
        let media = extractor.extract_frames(&path, &cfg).unwrap();

        assert_eq!(media.duration, 0.0);
        assert_eq!(media.frames.len(), 1);
        assert_eq!(media.frames[0].timestamp, 0.0);

        let _ = std::fs::remove_file(&path);
    }
}
