//! Adaptive scene-change frame sampling on top of [`crate::FfmpegFrameReaderBuilder`].
//!
//! Videos are first decoded at `target_fps` (evenly spaced), then thinned
//! down to the frames that actually differ from their predecessor by more
//! than `scene_change_threshold` (mean absolute luminance difference,
//! normalized to `0.0..=1.0`). `min_frames` and `max_scene_frames` are a
//! floor/ceiling on the result: if scene detection would keep fewer than
//! `min_frames`, frames are backfilled evenly spaced from the full decode;
//! if it would keep more than `max_scene_frames`, the least-different
//! frames beyond the first `max_scene_frames` are dropped.

use image::GrayImage;

use crate::{FfmpegError, FfmpegFrameReaderBuilder, VideoInfo};

#[derive(Clone, Copy, Debug)]
pub struct SceneSampleConfig {
    pub resolution: u32,
    pub target_fps: f64,
    pub min_frames: usize,
    pub max_scene_frames: usize,
    pub scene_change_threshold: f64,
}

/// One sampled frame: a square `resolution x resolution` grayscale image
/// plus the timestamp (seconds from start) it was decoded at.
pub struct SampledFrame {
    pub image: GrayImage,
    pub timestamp: f64,
}

fn mean_abs_luma_diff(a: &GrayImage, b: &GrayImage) -> f64 {
    if a.dimensions() != b.dimensions() {
        return 1.0;
    }
    let n = a.as_raw().len();
    if n == 0 {
        return 0.0;
    }
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw().iter())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    (total as f64 / n as f64) / 255.0
}

/// Decodes `path` at roughly `target_fps`, square-resizes every frame to
/// `resolution x resolution`, and keeps the scene-change subset described
/// in the module doc.
pub fn sample_scene_frames(
    path: &std::path::Path,
    cfg: &SceneSampleConfig,
) -> Result<(Vec<SampledFrame>, VideoInfo), FfmpegError> {
    let info = VideoInfo::new(path)?;

    let fps_string = format!("{}", cfg.target_fps);
    let mut builder = FfmpegFrameReaderBuilder::new(path);
    builder.fps(&fps_string);
    let (frame_iter, info) = builder.spawn_gray().map(|(iter, _)| (iter, info))?;

    let period = if cfg.target_fps > 0.0 { 1.0 / cfg.target_fps } else { 1.0 };
    let side = cfg.resolution.max(1);

    let decoded: Vec<(GrayImage, f64)> = frame_iter
        .enumerate()
        .map(|(i, frame)| {
            let resized = image::imageops::resize(&frame, side, side, image::imageops::FilterType::Triangle);
            (resized, i as f64 * period)
        })
        .collect();

    if decoded.is_empty() {
        return Ok((Vec::new(), info));
    }

    let mut kept: Vec<usize> = vec![0];
    for i in 1..decoded.len() {
        let diff = mean_abs_luma_diff(&decoded[i - 1].0, &decoded[i].0);
        if diff >= cfg.scene_change_threshold {
            kept.push(i);
        }
    }

    if kept.len() < cfg.min_frames.min(decoded.len()) {
        let want = cfg.min_frames.min(decoded.len());
        kept = even_spacing(decoded.len(), want);
    }

    if kept.len() > cfg.max_scene_frames {
        let mut scored: Vec<(usize, f64)> = kept
            .iter()
            .map(|&i| {
                let score = if i == 0 {
                    f64::MAX
                } else {
                    mean_abs_luma_diff(&decoded[i - 1].0, &decoded[i].0)
                };
                (i, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        scored.truncate(cfg.max_scene_frames);
        kept = scored.into_iter().map(|(i, _)| i).collect();
        kept.sort_unstable();
    }

    let sampled = kept
        .into_iter()
        .map(|i| SampledFrame {
            image: decoded[i].0.clone(),
            timestamp: decoded[i].1,
        })
        .collect();

    Ok((sampled, info))
}

fn even_spacing(len: usize, want: usize) -> Vec<usize> {
    if want == 0 || len == 0 {
        return Vec::new();
    }
    if want >= len {
        return (0..len).collect();
    }
    if want == 1 {
        return vec![0];
    }
    (0..want)
        .map(|i| i * (len - 1) / (want - 1))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn solid(v: u8) -> GrayImage {
        GrayImage::from_pixel(4, 4, image::Luma([v]))
    }

    #[test]
    fn test_mean_abs_luma_diff_identical_is_zero() {
        assert_eq!(mean_abs_luma_diff(&solid(100), &solid(100)), 0.0);
    }

    #[test]
    fn test_mean_abs_luma_diff_extremes_is_one() {
        assert_eq!(mean_abs_luma_diff(&solid(0), &solid(255)), 1.0);
    }

    #[test]
    fn test_even_spacing_respects_bounds() {
        let spaced = even_spacing(10, 3);
        assert_eq!(spaced.first(), Some(&0));
        assert_eq!(spaced.last(), Some(&9));
        assert_eq!(spaced.len(), 3);
    }

    #[test]
    fn test_even_spacing_want_exceeds_len() {
        assert_eq!(even_spacing(3, 10), vec![0, 1, 2]);
    }
}
