//! Similarity measures between media: single-frame Hamming similarity,
//! image-vs-video best-frame search, and DTW over video frame sequences.

use crate::hash_ops::hamming_distance;
use crate::model::{FrameInfo, MediaInfo};

/// Configuration for the adaptive per-pair similarity threshold.
#[derive(Clone, Copy, Debug)]
pub struct ThresholdConfig {
    pub image_similarity_threshold: f64,
    pub image_video_similarity_threshold: f64,
    pub video_similarity_threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            image_similarity_threshold: 0.90,
            image_video_similarity_threshold: 0.85,
            video_similarity_threshold: 0.80,
        }
    }
}

/// Similarity between two single frames: `1 - hamming / bits`, clamped to
/// `[0, 1]`. An empty hash on either side is defined as maximally dissimilar
/// unless both are empty, in which case the hashes carry no information and
/// are defined as identical.
pub fn image_similarity(f1: &FrameInfo, f2: &FrameInfo) -> f64 {
    if f1.hash.is_empty() && f2.hash.is_empty() {
        return 1.0;
    }
    if f1.hash.is_empty() || f2.hash.is_empty() {
        return 0.0;
    }

    let bits = 8 * f1.hash.len().max(f2.hash.len());
    let dist = hamming_distance(&f1.hash, &f2.hash);
    (1.0 - f64::from(dist) / bits as f64).clamp(0.0, 1.0)
}

/// Similarity between a single image frame and every frame of a video:
/// the maximum pairwise [`image_similarity`], with an early exit on an
/// exact match. Either side having no frames yields 0.
pub fn image_video_similarity(image: &FrameInfo, video: &MediaInfo) -> f64 {
    let mut best = 0.0f64;
    for frame in &video.frames {
        let sim = image_similarity(image, frame);
        if sim > best {
            best = sim;
        }
        if best >= 1.0 {
            break;
        }
    }
    best
}

/// Dynamic Time Warping over two frame-hash sequences, with per-cell cost
/// `max(0, 1 - image_similarity)` and the standard 3-neighborhood
/// recurrence, computed with a single rolling row to keep memory at
/// `O(|seq2|)`.
///
/// Both sequences empty ⇒ 1 (trivially identical); exactly one empty ⇒ 0.
pub fn sequence_similarity_dtw(seq1: &[FrameInfo], seq2: &[FrameInfo]) -> f64 {
    let (m, n) = (seq1.len(), seq2.len());
    if m == 0 && n == 0 {
        return 1.0;
    }
    if m == 0 || n == 0 {
        return 0.0;
    }

    const INF: f64 = f64::INFINITY;

    // prev/curr are rows of length n+1; index 0 is the "before sequence 2" boundary.
    let mut prev = vec![INF; n + 1];
    let mut curr = vec![INF; n + 1];
    prev[0] = 0.0;

    for i in 1..=m {
        curr[0] = INF;
        for j in 1..=n {
            let cost = (1.0 - image_similarity(&seq1[i - 1], &seq2[j - 1])).max(0.0);
            let best_prev = prev[j].min(curr[j - 1]).min(prev[j - 1]);
            curr[j] = cost + best_prev;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let dtw_cost = prev[n];
    (1.0 - dtw_cost / (m.max(n) as f64)).max(0.0)
}

/// Which adaptive threshold applies to a pair of media, based on whether
/// either side is a video (`duration > 0`).
pub fn adaptive_threshold(m1: &MediaInfo, m2: &MediaInfo, cfg: &ThresholdConfig) -> f64 {
    match (m1.is_video(), m2.is_video()) {
        (false, false) => cfg.image_similarity_threshold,
        (true, true) => cfg.video_similarity_threshold,
        _ => cfg.image_video_similarity_threshold,
    }
}

/// The overall similarity between two arbitrary media items, dispatching to
/// the appropriate kernel based on whether each side is a still image or a
/// video.
pub fn media_similarity(m1: &MediaInfo, m2: &MediaInfo) -> f64 {
    match (m1.is_video(), m2.is_video()) {
        (false, false) => {
            let (Some(f1), Some(f2)) = (m1.frames.first(), m2.frames.first()) else {
                return 0.0;
            };
            image_similarity(f1, f2)
        }
        (true, true) => sequence_similarity_dtw(&m1.frames, &m2.frames),
        (false, true) => m1
            .frames
            .first()
            .map_or(0.0, |f| image_video_similarity(f, m2)),
        (true, false) => m2
            .frames
            .first()
            .map_or(0.0, |f| image_video_similarity(f, m1)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn frame(hash: &[u8], t: f64) -> FrameInfo {
        FrameInfo::new(hash.to_vec(), t)
    }

    #[test]
    fn test_image_similarity_self_is_one() {
        let f = frame(&[0xAB, 0x12, 0x99], 0.0);
        assert_eq!(image_similarity(&f, &f), 1.0);
    }

    #[test]
    fn test_image_similarity_empty_hashes() {
        let a = frame(&[], 0.0);
        let b = frame(&[], 0.0);
        assert_eq!(image_similarity(&a, &b), 1.0);

        let c = frame(&[0x00], 0.0);
        assert_eq!(image_similarity(&a, &c), 0.0);
    }

    #[test]
    fn test_dtw_self_similarity_is_one() {
        let media = MediaInfo::new(
            vec![frame(&[1, 2, 3], 0.0), frame(&[4, 5, 6], 1.0), frame(&[7, 8, 9], 2.0)],
            3.0,
        );
        let sim = sequence_similarity_dtw(&media.frames, &media.frames);
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dtw_empty_cases() {
        assert_eq!(sequence_similarity_dtw(&[], &[]), 1.0);
        let seq = vec![frame(&[1], 0.0)];
        assert_eq!(sequence_similarity_dtw(&seq, &[]), 0.0);
        assert_eq!(sequence_similarity_dtw(&[], &seq), 0.0);
    }

    #[test]
    fn test_adaptive_threshold_selection() {
        let cfg = ThresholdConfig::default();
        let img = MediaInfo::new(vec![frame(&[0], 0.0)], 0.0);
        let vid = MediaInfo::new(vec![frame(&[0], 0.0), frame(&[1], 1.0)], 10.0);

        assert_eq!(adaptive_threshold(&img, &img, &cfg), cfg.image_similarity_threshold);
        assert_eq!(adaptive_threshold(&vid, &vid, &cfg), cfg.video_similarity_threshold);
        assert_eq!(adaptive_threshold(&img, &vid, &cfg), cfg.image_video_similarity_threshold);
    }
}
