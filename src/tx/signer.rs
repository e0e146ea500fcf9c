//! Transaction Signer
//!
//! Hashes a canonical encoding with the suite digest, signs the hash with
//! the key pair and compiles the signed-transaction envelope.
//!
//! The key pair is taken by value: it is released when `sign` returns,
//! whether it succeeded or not.

use std::sync::Arc;

use crate::crypto::{backend_for, CryptoBackend};
use crate::error::{SignerError, SignerResult};
use crate::signing::compile_signed_transaction;
use crate::types::{SignatureMode, SignedTransaction};
use crate::wallet::KeyPair;

/// Signs canonical encodings with one backend
#[derive(Debug, Clone)]
pub struct TransactionSigner {
    backend: Arc<dyn CryptoBackend>,
}

impl TransactionSigner {
    pub fn new(backend: Arc<dyn CryptoBackend>) -> Self {
        Self { backend }
    }

    pub fn for_mode(mode: SignatureMode) -> Self {
        Self::new(backend_for(mode))
    }

    pub fn mode(&self) -> SignatureMode {
        self.backend.mode()
    }

    /// Digest of a canonical encoding
    pub fn hash(&self, canonical_encoding: &[u8]) -> [u8; 32] {
        self.backend.hash(canonical_encoding)
    }

    /// Sign `canonical_encoding` with `key_pair`
    pub fn sign(&self, key_pair: KeyPair, canonical_encoding: &[u8]) -> SignerResult<SignedTransaction> {
        if key_pair.mode() != self.mode() {
            return Err(SignerError::signing_failed(format!(
                "Key pair is {} but signer is {}",
                key_pair.mode(),
                self.mode()
            )));
        }

        let hash = self.hash(canonical_encoding);
        let signature = self
            .backend
            .sign(key_pair.secret(), &hash)
            .map_err(|e| SignerError::signing_failed(e.to_string()))?;

        let signed = compile_signed_transaction(canonical_encoding, hash, signature, self.backend.as_ref())?;

        if signed.sender != key_pair.address() {
            return Err(SignerError::signing_failed(
                "Recovered signer does not match key pair",
            ));
        }

        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::signing::TransactionEncoder;
    use crate::types::TransactionFields;
    use crate::wallet::{CountingTracker, KeyMaterial};

    fn encoding() -> Vec<u8> {
        let fields = TransactionFields::new(
            "chain0",
            "group0",
            "0x1234567890abcdef1234567890abcdef12345678",
            vec![0x0a, 0xbc],
            1000,
        );
        TransactionEncoder::new().encode(&fields).unwrap()
    }

    #[test]
    fn test_sign_ecdsa() {
        let pair = KeyMaterial::for_mode(SignatureMode::Ecdsa).derive(&[5u8; 32]).unwrap();
        let address = pair.address();
        let signed = TransactionSigner::for_mode(SignatureMode::Ecdsa)
            .sign(pair, &encoding())
            .unwrap();

        assert_eq!(signed.signature.len(), 65);
        assert!(signed.signature[64] <= 1);
        assert_eq!(signed.sender, address);
        assert_eq!(signed.hash, crate::crypto::keccak256(&encoding()));
    }

    #[test]
    fn test_sign_sm() {
        let pair = KeyMaterial::for_mode(SignatureMode::Sm).derive(&[5u8; 32]).unwrap();
        let public_key = *pair.public_key();
        let signed = TransactionSigner::for_mode(SignatureMode::Sm)
            .sign(pair, &encoding())
            .unwrap();

        assert_eq!(signed.signature.len(), 128);
        assert_eq!(&signed.signature[64..], &public_key[..]);
        assert_eq!(signed.hash, crate::crypto::sm3(&encoding()));
    }

    #[test]
    fn test_deterministic() {
        let signer = TransactionSigner::for_mode(SignatureMode::Ecdsa);
        let keys = KeyMaterial::for_mode(SignatureMode::Ecdsa);
        let a = signer.sign(keys.derive(&[5u8; 32]).unwrap(), &encoding()).unwrap();
        let b = signer.sign(keys.derive(&[5u8; 32]).unwrap(), &encoding()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mode_mismatch_releases_key() {
        let tracker = Arc::new(CountingTracker::new());
        let pair = KeyMaterial::for_mode(SignatureMode::Sm)
            .with_tracker(tracker.clone())
            .derive(&[5u8; 32])
            .unwrap();
        assert_eq!(tracker.live(), 1);

        let err = TransactionSigner::for_mode(SignatureMode::Ecdsa)
            .sign(pair, &encoding())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SigningFailure);
        assert_eq!(tracker.live(), 0);
    }
}
