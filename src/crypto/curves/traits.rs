//! Crypto Backend Trait
//!
//! Defines the interface every signature suite implements. The signing
//! pipeline only talks to `dyn CryptoBackend`, so suites can be swapped
//! or replaced by test doubles without touching the pipeline.

use super::CurveError;
use crate::types::SignatureMode;

/// Uncompressed public key point without the SEC1 `0x04` tag
pub type PublicKeyBytes = [u8; 64];

/// Hashing and signing primitives for one signature suite
pub trait CryptoBackend: Send + Sync + std::fmt::Debug {
    /// The suite this backend implements
    fn mode(&self) -> SignatureMode;

    /// Expected raw private key length
    fn private_key_len(&self) -> usize {
        self.mode().private_key_len()
    }

    /// Digest used for transaction hashes and addresses
    fn hash(&self, data: &[u8]) -> [u8; 32];

    /// Derive the public key point from a raw private key
    fn public_key(&self, private_key: &[u8]) -> Result<PublicKeyBytes, CurveError>;

    /// Sign a 32-byte digest, returning the suite's signature envelope
    fn sign(&self, private_key: &[u8], hash: &[u8; 32]) -> Result<Vec<u8>, CurveError>;

    /// Recover (ECDSA) or verify-and-extract (SM) the signer's public key
    fn recover(&self, hash: &[u8; 32], signature: &[u8]) -> Result<PublicKeyBytes, CurveError>;

    /// Account address: last 20 bytes of the suite digest of the public key
    fn address(&self, public_key: &PublicKeyBytes) -> [u8; 20] {
        let digest = self.hash(public_key);
        let mut address = [0u8; 20];
        address.copy_from_slice(&digest[12..]);
        address
    }
}
