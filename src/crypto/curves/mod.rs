//! Signature Suite Backends
//!
//! - `secp256k1`: ECDSA with Keccak-256, the standard suite
//! - `sm2`: SM2 with SM3, the national-standard suite
//!
//! # Example
//!
//! ```rust,ignore
//! use bcos_signer::crypto::{backend_for, CryptoBackend};
//! use bcos_signer::SignatureMode;
//!
//! let backend = backend_for(SignatureMode::Sm);
//! let hash = backend.hash(b"payload");
//! let sig = backend.sign(&[7u8; 32], &hash)?;
//! ```

pub mod secp256k1;
pub mod sm2;
pub mod traits;

pub use self::secp256k1::Secp256k1Backend;
pub use self::sm2::Sm2Backend;
pub use traits::*;

use crate::error::{ErrorCode, SignerError};
use serde::{Deserialize, Serialize};

// MARK: - Curve Errors

/// Errors raised by the signature primitives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveError {
    InvalidPrivateKey(String),
    InvalidPublicKey(String),
    InvalidSignature(String),
    SigningFailed(String),
    VerificationFailed(String),
}

impl std::fmt::Display for CurveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrivateKey(s) => write!(f, "Invalid private key: {}", s),
            Self::InvalidPublicKey(s) => write!(f, "Invalid public key: {}", s),
            Self::InvalidSignature(s) => write!(f, "Invalid signature: {}", s),
            Self::SigningFailed(s) => write!(f, "Signing failed: {}", s),
            Self::VerificationFailed(s) => write!(f, "Verification failed: {}", s),
        }
    }
}

impl std::error::Error for CurveError {}

impl From<CurveError> for SignerError {
    fn from(e: CurveError) -> Self {
        let code = match e {
            CurveError::InvalidPrivateKey(_) => ErrorCode::InvalidPrivateKey,
            CurveError::SigningFailed(_) => ErrorCode::SigningFailure,
            CurveError::InvalidPublicKey(_)
            | CurveError::InvalidSignature(_)
            | CurveError::VerificationFailed(_) => ErrorCode::InvalidInput,
        };
        SignerError::new(code, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_error_mapping() {
        let err: SignerError = CurveError::SigningFailed("rejected".into()).into();
        assert_eq!(err.code, ErrorCode::SigningFailure);

        let err: SignerError = CurveError::InvalidPrivateKey("zero".into()).into();
        assert_eq!(err.code, ErrorCode::InvalidPrivateKey);
        assert!(err.message.contains("zero"));
    }
}
