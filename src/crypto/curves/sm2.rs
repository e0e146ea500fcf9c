//! SM2 Backend (national standard suite)
//!
//! Features:
//! - SM3 transaction hashes
//! - SM2 signatures with the default distinguishing id
//! - 128-byte envelope `r || s || public_key`; SM2 signatures are not
//!   recoverable, so the signer's key travels with the signature
//! - RFC 6979 deterministic nonces

use super::{CryptoBackend, CurveError, PublicKeyBytes};
use crate::crypto::hash::sm3;
use crate::types::SignatureMode;
use ::signature::{Signer, Verifier};
use ::sm2::dsa::{Signature, SigningKey, VerifyingKey};
use ::sm2::elliptic_curve::sec1::ToEncodedPoint;
use ::sm2::SecretKey;

/// Distinguishing identifier mixed into Z_A (GM/T 0009-2012 default)
pub const DEFAULT_DIST_ID: &str = "1234567812345678";

/// SM2 + SM3 backend
#[derive(Debug, Clone, Copy, Default)]
pub struct Sm2Backend;

impl Sm2Backend {
    fn secret_key(private_key: &[u8]) -> Result<SecretKey, CurveError> {
        // `SecretKey::from_slice` would left-pad short input, so the
        // length is checked here first.
        if private_key.len() != 32 {
            return Err(CurveError::InvalidPrivateKey(format!(
                "Private key must be 32 bytes, got {}",
                private_key.len()
            )));
        }

        SecretKey::from_slice(private_key)
            .map_err(|_| CurveError::InvalidPrivateKey("scalar out of range".to_string()))
    }

    fn point_bytes(secret: &SecretKey) -> PublicKeyBytes {
        let encoded = secret.public_key().to_encoded_point(false);
        let mut out = [0u8; 64];
        out.copy_from_slice(&encoded.as_bytes()[1..]);
        out
    }
}

impl CryptoBackend for Sm2Backend {
    fn mode(&self) -> SignatureMode {
        SignatureMode::Sm
    }

    fn hash(&self, data: &[u8]) -> [u8; 32] {
        sm3(data)
    }

    fn public_key(&self, private_key: &[u8]) -> Result<PublicKeyBytes, CurveError> {
        let secret = Self::secret_key(private_key)?;
        Ok(Self::point_bytes(&secret))
    }

    fn sign(&self, private_key: &[u8], hash: &[u8; 32]) -> Result<Vec<u8>, CurveError> {
        let secret = Self::secret_key(private_key)
            .map_err(|e| CurveError::SigningFailed(e.to_string()))?;

        let signing_key = SigningKey::new(DEFAULT_DIST_ID, &secret)
            .map_err(|e| CurveError::SigningFailed(format!("Invalid signing key: {}", e)))?;
        let sig: Signature = signing_key
            .try_sign(hash)
            .map_err(|e| CurveError::SigningFailed(e.to_string()))?;

        let mut out = Vec::with_capacity(128);
        out.extend_from_slice(&sig.to_bytes());
        out.extend_from_slice(&Self::point_bytes(&secret));
        Ok(out)
    }

    fn recover(&self, hash: &[u8; 32], signature: &[u8]) -> Result<PublicKeyBytes, CurveError> {
        if signature.len() != 128 {
            return Err(CurveError::InvalidSignature(format!(
                "Signature must be 128 bytes, got {}",
                signature.len()
            )));
        }

        let mut sec1 = Vec::with_capacity(65);
        sec1.push(0x04);
        sec1.extend_from_slice(&signature[64..]);

        let verifying_key = VerifyingKey::from_sec1_bytes(DEFAULT_DIST_ID, &sec1)
            .map_err(|e| CurveError::InvalidPublicKey(e.to_string()))?;
        let sig = Signature::from_slice(&signature[..64])
            .map_err(|e| CurveError::InvalidSignature(e.to_string()))?;

        verifying_key
            .verify(hash, &sig)
            .map_err(|e| CurveError::VerificationFailed(e.to_string()))?;

        let mut out = [0u8; 64];
        out.copy_from_slice(&signature[64..]);
        Ok(out)
    }
}
