//! Cryptographic primitives
//!
//! This module provides:
//! - Digest functions for both suites (Keccak-256, SM3)
//! - The `CryptoBackend` abstraction with secp256k1 and SM2 implementations
//! - One-time, idempotent initialization of process-wide crypto state

pub mod curves;
pub mod hash;

pub use curves::{CryptoBackend, CurveError, PublicKeyBytes, Secp256k1Backend, Sm2Backend};
pub use hash::{keccak256, sm3};

use crate::types::SignatureMode;
use std::sync::Arc;

/// Initialize shared crypto state (the secp256k1 context).
///
/// Safe to call any number of times from any thread; the context is
/// built at most once. Calling it is optional: first use initializes
/// lazily as well.
pub fn init() {
    lazy_static::initialize(&curves::secp256k1::SECP256K1);
}

/// Default backend for a signature mode
pub fn backend_for(mode: SignatureMode) -> Arc<dyn CryptoBackend> {
    match mode {
        SignatureMode::Ecdsa => Arc::new(Secp256k1Backend),
        SignatureMode::Sm => Arc::new(Sm2Backend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        let handles: Vec<_> = (0..4).map(|_| std::thread::spawn(init)).collect();
        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_backend_for_mode() {
        assert_eq!(backend_for(SignatureMode::Ecdsa).mode(), SignatureMode::Ecdsa);
        assert_eq!(backend_for(SignatureMode::Sm).mode(), SignatureMode::Sm);
        assert_eq!(backend_for(SignatureMode::Sm).hash(b"abc"), sm3(b"abc"));
    }
}
