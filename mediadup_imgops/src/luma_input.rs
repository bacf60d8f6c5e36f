//! Converts a decoded frame into the flat row-major `f64` luminance buffer
//! `mediadup_core::dct_hasher::DctHasher::hash` expects: square-resized to
//! `resolution x resolution`, values in `0.0..=255.0`.

use std::num::NonZeroU32;

use image::{GrayImage, Luma};

use crate::resize_gray::resize_frame;

/// Resizes `frame` to `resolution x resolution` (letterbox-free, full-frame
/// crop) and flattens it row-major into `f64` luminance values.
#[must_use]
pub fn frame_to_hash_input(frame: &GrayImage, resolution: u32) -> Vec<f64> {
    let side = NonZeroU32::new(resolution).unwrap_or(NonZeroU32::new(1).unwrap());
    let resized = resize_frame(frame, side, side);
    resized
        .pixels()
        .map(|Luma([v])| f64::from(*v))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_output_length_matches_resolution_squared() {
        let frame = GrayImage::from_pixel(64, 64, Luma([128]));
        let out = frame_to_hash_input(&frame, 8);
        assert_eq!(out.len(), 64);
    }

    #[test]
    fn test_constant_frame_yields_constant_buffer() {
        let frame = GrayImage::from_pixel(32, 32, Luma([200]));
        let out = frame_to_hash_input(&frame, 4);
        assert!(out.iter().all(|&v| (v - 200.0).abs() < 1.0));
    }
}
