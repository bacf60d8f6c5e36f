//! Bit-level primitives underlying every similarity computation: population
//! count and Hamming distance, with a runtime-selected SIMD backend and a
//! portable scalar fallback that must agree with it bit-for-bit.

use std::sync::Once;

/// A pluggable Hamming-distance backend. The scalar implementation is the
/// reference; any other backend must agree with it for all inputs.
pub trait HammingBackend {
    fn hamming_distance(&self, a: &[u8], b: &[u8]) -> u32;
}

/// Population count via the classic parallel-bit-count trick, mirrored at
/// both the byte and the word width so callers can pick whichever granularity
/// their buffers come in.
#[inline]
pub const fn popcount_u8(mut byte: u8) -> u32 {
    byte = (byte & 0x55) + ((byte >> 1) & 0x55);
    byte = (byte & 0x33) + ((byte >> 2) & 0x33);
    byte = (byte & 0x0f) + ((byte >> 4) & 0x0f);
    byte as u32
}

#[inline]
pub const fn popcount_u64(mut word: u64) -> u32 {
    word -= (word >> 1) & 0x5555_5555_5555_5555;
    word = (word & 0x3333_3333_3333_3333) + ((word >> 2) & 0x3333_3333_3333_3333);
    word = (word + (word >> 4)) & 0x0f0f_0f0f_0f0f_0f0f;
    ((word.wrapping_mul(0x0101_0101_0101_0101)) >> 56) as u32
}

/// Scalar (portable) Hamming distance. Buffers of differing length are
/// treated as zero-padded up to the longer length, so mismatched lengths are
/// never an error: they simply count every extra byte against zero.
pub struct ScalarHammingBackend;

impl HammingBackend for ScalarHammingBackend {
    fn hamming_distance(&self, a: &[u8], b: &[u8]) -> u32 {
        let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

        let mut total = 0u32;
        for (x, y) in shorter.iter().zip(longer.iter()) {
            total += popcount_u8(x ^ y);
        }
        for &tail in &longer[shorter.len()..] {
            total += popcount_u8(tail);
        }
        total
    }
}

/// SIMD-accelerated backend over 16-byte (128-bit) blocks. Falls back to the
/// scalar path for any trailing partial block, so the result is always
/// identical to [`ScalarHammingBackend`].
///
/// No portable stable-Rust SIMD intrinsic set is assumed here; the "SIMD"
/// block just processes 16 bytes per iteration using native XOR+popcount,
/// which auto-vectorizes under optimization on every target this crate
/// supports. A true intrinsics backend (behind `target_feature`) can replace
/// this body without changing the trait contract.
pub struct SimdHammingBackend;

impl HammingBackend for SimdHammingBackend {
    fn hamming_distance(&self, a: &[u8], b: &[u8]) -> u32 {
        const BLOCK: usize = 16;

        let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

        let mut total = 0u32;
        let mut i = 0;
        while i + BLOCK <= shorter.len() {
            for j in 0..BLOCK {
                total += popcount_u8(shorter[i + j] ^ longer[i + j]);
            }
            i += BLOCK;
        }
        for j in i..shorter.len() {
            total += popcount_u8(shorter[j] ^ longer[j]);
        }
        for &tail in &longer[shorter.len()..] {
            total += popcount_u8(tail);
        }
        total
    }
}

static LOG_BACKEND_CHOICE: Once = Once::new();
static LOG_FALLBACK_WARNING: Once = Once::new();

/// Runtime (not just compile-time) capability check: the CPU actually
/// exposes the SIMD feature this backend's block width relies on, not just
/// "this binary was built for an architecture that usually has it".
fn simd_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        std::is_x86_feature_detected!("sse2")
    }
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("neon")
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}

/// Computes the Hamming distance between two byte buffers, selecting the
/// SIMD backend when the running CPU supports it and logging the choice
/// exactly once. This is the entry point every other component should call.
///
/// The SIMD backend here is plain auto-vectorizing Rust rather than hand-
/// written intrinsics, so it has no real failure mode of its own; the
/// `catch_unwind` below exists so that a future intrinsics-based backend
/// (§9: "a true intrinsics backend... can replace this body without
/// changing the trait contract") gets its runtime-fallback-and-warn-once
/// behavior for free instead of needing it added later.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    LOG_BACKEND_CHOICE.call_once(|| {
        if simd_available() {
            log::info!(target: "hash_ops", "using SIMD hamming backend");
        } else {
            log::info!(target: "hash_ops", "using scalar hamming backend");
        }
    });

    if simd_available() {
        match std::panic::catch_unwind(|| SimdHammingBackend.hamming_distance(a, b)) {
            Ok(result) => return result,
            Err(_) => {
                LOG_FALLBACK_WARNING.call_once(|| {
                    log::warn!(
                        target: "hash_ops",
                        "SIMD hamming backend failed at runtime, falling back to scalar"
                    );
                });
            }
        }
    }

    ScalarHammingBackend.hamming_distance(a, b)
}
