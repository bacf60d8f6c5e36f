//! Hex encode/decode for content hashes and packed perceptual-hash bytes.
//! The cache and the on-disk hash payload both round-trip through hex
//! strings elsewhere in the stack (`FileStats.content_hash`, serialized
//! frame hashes); this is the one place that codec is implemented, so every
//! caller gets the same precondition checks.

use crate::error::{Error, ErrorContext};
use crate::Result;

const LOWER_HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Encodes `bytes` as a lowercase hex string, two characters per byte.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(LOWER_HEX_DIGITS[(b >> 4) as usize] as char);
        out.push(LOWER_HEX_DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}

/// Decodes a hex string into bytes. Rejects odd-length input and any
/// non-hex-digit character with a [`Error::Validation`] rather than
/// panicking or silently truncating.
pub fn decode(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(Error::Validation(
            ErrorContext::new("hex::decode").with_cause(format!("odd-length hex string: {} chars", s.len())),
        ));
    }

    let digits = s.as_bytes();
    let mut out = Vec::with_capacity(digits.len() / 2);
    for pair in digits.chunks_exact(2) {
        let hi = hex_digit_value(pair[0])?;
        let lo = hex_digit_value(pair[1])?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

fn hex_digit_value(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::Validation(
            ErrorContext::new("hex::decode").with_cause(format!("non-hex character: {:?}", c as char)),
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_trip_lowercased() {
        let original = "DEADBEEF00";
        let bytes = decode(original).unwrap();
        let re_encoded = encode(&bytes);
        assert_eq!(re_encoded, original.to_lowercase());
    }

    #[test]
    fn test_empty_round_trips() {
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_rejects_odd_length() {
        assert!(decode("abc").is_err());
    }

    #[test]
    fn test_rejects_non_hex_characters() {
        assert!(decode("zz").is_err());
        assert!(decode("gg").is_err());
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        assert_eq!(decode("AB").unwrap(), decode("ab").unwrap());
    }

    #[test]
    fn test_property_round_trip_through_bytes() {
        use rand::prelude::*;

        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            let len = rng.random_range(0..32);
            let bytes: Vec<u8> = (0..len).map(|_| rng.random::<u8>()).collect();
            let hex = encode(&bytes);
            let decoded = decode(&hex).unwrap();
            assert_eq!(decoded, bytes);
            assert_eq!(encode(&decoded), hex.to_lowercase());
        }
    }
}
