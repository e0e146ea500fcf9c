//! Digest functions paired with each signature suite

use sm3::{Digest, Sm3};
use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 (ECDSA suite transaction hash and address derivation)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// SM3 (SM suite transaction hash and address derivation)
pub fn sm3(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sm3::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_sm3_abc() {
        // GB/T 32905-2016 example 1
        assert_eq!(
            hex::encode(sm3(b"abc")),
            "66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0"
        );
    }

    #[test]
    fn test_suites_differ() {
        assert_ne!(keccak256(b"group0"), sm3(b"group0"));
    }
}
