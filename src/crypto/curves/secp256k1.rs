//! secp256k1 ECDSA Backend
//!
//! Features:
//! - Keccak-256 transaction hashes
//! - Recoverable signatures, 65 bytes `r || s || v` with `v` in {0, 1}
//! - RFC 6979 deterministic nonces (libsecp256k1 default)

use super::{CryptoBackend, CurveError, PublicKeyBytes};
use crate::crypto::hash::keccak256;
use crate::types::SignatureMode;
use ::secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use ::secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};

lazy_static::lazy_static! {
    /// Process-wide signing/verification context
    pub(crate) static ref SECP256K1: Secp256k1<All> = Secp256k1::new();
}

/// secp256k1 + Keccak-256 backend
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Backend;

impl Secp256k1Backend {
    fn secret_key(private_key: &[u8]) -> Result<SecretKey, CurveError> {
        if private_key.len() != 32 {
            return Err(CurveError::InvalidPrivateKey(format!(
                "Private key must be 32 bytes, got {}",
                private_key.len()
            )));
        }

        SecretKey::from_slice(private_key)
            .map_err(|e| CurveError::InvalidPrivateKey(e.to_string()))
    }

    fn strip_tag(pk: &PublicKey) -> PublicKeyBytes {
        let uncompressed = pk.serialize_uncompressed();
        let mut out = [0u8; 64];
        out.copy_from_slice(&uncompressed[1..]);
        out
    }
}

impl CryptoBackend for Secp256k1Backend {
    fn mode(&self) -> SignatureMode {
        SignatureMode::Ecdsa
    }

    fn hash(&self, data: &[u8]) -> [u8; 32] {
        keccak256(data)
    }

    fn public_key(&self, private_key: &[u8]) -> Result<PublicKeyBytes, CurveError> {
        let sk = Self::secret_key(private_key)?;
        let pk = PublicKey::from_secret_key(&SECP256K1, &sk);
        Ok(Self::strip_tag(&pk))
    }

    fn sign(&self, private_key: &[u8], hash: &[u8; 32]) -> Result<Vec<u8>, CurveError> {
        let sk = Self::secret_key(private_key)
            .map_err(|e| CurveError::SigningFailed(e.to_string()))?;

        let msg = Message::from_digest(*hash);
        let sig = SECP256K1.sign_ecdsa_recoverable(&msg, &sk);
        let (recovery_id, compact) = sig.serialize_compact();

        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&compact);
        out.push(recovery_id.to_i32() as u8);
        Ok(out)
    }

    fn recover(&self, hash: &[u8; 32], signature: &[u8]) -> Result<PublicKeyBytes, CurveError> {
        if signature.len() != 65 {
            return Err(CurveError::InvalidSignature(format!(
                "Signature must be 65 bytes, got {}",
                signature.len()
            )));
        }

        let recovery_id = RecoveryId::from_i32(signature[64] as i32)
            .map_err(|e| CurveError::InvalidSignature(format!("Invalid recovery ID: {}", e)))?;
        let sig = RecoverableSignature::from_compact(&signature[..64], recovery_id)
            .map_err(|e| CurveError::InvalidSignature(e.to_string()))?;

        let msg = Message::from_digest(*hash);
        let pk = SECP256K1
            .recover_ecdsa(&msg, &sig)
            .map_err(|e| CurveError::VerificationFailed(format!("Recovery failed: {}", e)))?;

        SECP256K1
            .verify_ecdsa(&msg, &sig.to_standard(), &pk)
            .map_err(|e| CurveError::VerificationFailed(e.to_string()))?;

        Ok(Self::strip_tag(&pk))
    }
}
