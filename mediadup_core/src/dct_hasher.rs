//! Perceptual hash construction via a separable 2D DCT, following the
//! row-pass/transpose/column-pass structure of a classic DCT-II
//! implementation, but computing only the low `hashSize` frequencies
//! directly via a precomputed cosine-coefficient table rather than a full
//! `resolution`-point transform.

use bitvec::prelude::*;

use crate::error::{Error, ErrorContext};
use crate::quickselect::quickselect;

/// Precomputed constants for one `(resolution, hash_size)` pair. Building
/// this is the expensive part; the DCT itself is two small matrix
/// multiplies once the tables exist.
pub struct DctHasher {
    resolution: usize,
    hash_size: usize,
    /// flat, length `hash_size * resolution`: `coefficients[u * resolution + x] = cos((2x+1) u pi / (2 resolution))`
    dct_coefficients: Vec<f64>,
    /// length `hash_size`
    norm_factors: Vec<f64>,
}

impl DctHasher {
    pub fn new(resolution: usize, hash_size: usize) -> crate::error::Result<Self> {
        if hash_size == 0 || resolution == 0 || hash_size > resolution {
            return Err(Error::Validation(
                ErrorContext::new("DctHasher::new")
                    .with_cause(format!("invalid resolution={resolution} hash_size={hash_size}")),
            ));
        }

        let mut dct_coefficients = Vec::with_capacity(hash_size * resolution);
        for u in 0..hash_size {
            for x in 0..resolution {
                let angle = ((2 * x + 1) as f64 * u as f64 * std::f64::consts::PI)
                    / (2.0 * resolution as f64);
                dct_coefficients.push(angle.cos());
            }
        }

        let norm_factors = (0..hash_size)
            .map(|u| {
                let base = (2.0 / resolution as f64).sqrt();
                if u == 0 {
                    base / std::f64::consts::SQRT_2
                } else {
                    base
                }
            })
            .collect();

        Ok(Self {
            resolution,
            hash_size,
            dct_coefficients,
            norm_factors,
        })
    }

    pub fn hash_size(&self) -> usize {
        self.hash_size
    }

    pub fn hash_bytes(&self) -> usize {
        (self.hash_size * self.hash_size).div_ceil(8)
    }

    #[inline]
    fn coeff(&self, u: usize, x: usize) -> f64 {
        self.dct_coefficients[u * self.resolution + x]
    }

    /// Computes the packed perceptual hash of a `resolution x resolution`
    /// row-major grayscale luminance block (values in any consistent unit;
    /// only relative magnitude matters).
    pub fn hash(&self, input: &[f64]) -> crate::error::Result<Vec<u8>> {
        if input.len() != self.resolution * self.resolution {
            return Err(Error::Validation(
                ErrorContext::new("DctHasher::hash").with_cause(format!(
                    "expected {} samples, got {}",
                    self.resolution * self.resolution,
                    input.len()
                )),
            ));
        }
        if self.dct_coefficients.len() < self.hash_size * self.resolution {
            return Err(Error::Hashing(
                ErrorContext::new("DctHasher::hash").with_cause("coefficient table too short"),
            ));
        }

        // Row pass: T[y][u] = sum_x input[y][x] * coeff(u, x)
        let mut t = vec![0.0f64; self.resolution * self.hash_size];
        for y in 0..self.resolution {
            let row = &input[y * self.resolution..(y + 1) * self.resolution];
            for u in 0..self.hash_size {
                let mut acc = 0.0;
                for (x, &sample) in row.iter().enumerate() {
                    acc += sample * self.coeff(u, x);
                }
                t[y * self.hash_size + u] = acc;
            }
        }

        // Column pass: D[u][v] = normFactors[u] * normFactors[v] * sum_y coeff(v, y) * T[y][u]
        let mut d = vec![0.0f64; self.hash_size * self.hash_size];
        for u in 0..self.hash_size {
            for v in 0..self.hash_size {
                let mut acc = 0.0;
                for y in 0..self.resolution {
                    acc += self.coeff(v, y) * t[y * self.hash_size + u];
                }
                d[u * self.hash_size + v] = self.norm_factors[u] * self.norm_factors[v] * acc;
            }
        }

        self.bits_from_coefficients(&d)
    }

    fn bits_from_coefficients(&self, d: &[f64]) -> crate::error::Result<Vec<u8>> {
        let mut ac: Vec<f64> = d
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != 0)
            .map(|(_, &v)| v)
            .collect();

        if ac.is_empty() {
            return Err(Error::hashing(
                "DctHasher::bits_from_coefficients",
                "cannot compute median AC value",
            ));
        }

        let mid = ac.len() / 2;
        let median = if ac.len() % 2 == 1 {
            quickselect(&mut ac, mid)
        } else {
            let hi = quickselect(&mut ac, mid);
            let lo = quickselect(&mut ac, mid - 1);
            (hi + lo) / 2.0
        };

        // Lsb0 so that bit `k` lands in byte `k/8` at bit position `k%8`,
        // matching the little-endian-by-bit-index packing this hash's
        // on-disk/cache representation contracts to.
        let mut bits: BitVec<u8, Lsb0> = BitVec::repeat(false, d.len());
        for (k, &val) in d.iter().enumerate() {
            bits.set(k, k != 0 && val > median);
        }
        Ok(bits.into_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_constant_input_yields_zero_hash() {
        let hasher = DctHasher::new(4, 2).unwrap();
        let input = vec![1.0f64; 16];
        let hash = hasher.hash(&input).unwrap();
        assert_eq!(hash, vec![0u8; hasher.hash_bytes()]);
    }

    #[test]
    fn test_stable_for_identical_input() {
        let hasher = DctHasher::new(32, 8).unwrap();
        let input: Vec<f64> = (0..32 * 32).map(|i| (i % 17) as f64).collect();
        let h1 = hasher.hash(&input).unwrap();
        let h2 = hasher.hash(&input).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_rejects_wrong_input_len() {
        let hasher = DctHasher::new(8, 4).unwrap();
        assert!(hasher.hash(&[0.0; 10]).is_err());
    }

    #[test]
    fn test_rejects_hash_size_larger_than_resolution() {
        assert!(DctHasher::new(4, 8).is_err());
    }

    #[test]
    fn test_hash_byte_length() {
        let hasher = DctHasher::new(32, 8).unwrap();
        assert_eq!(hasher.hash_bytes(), 8); // 64 bits / 8
    }
}
