//! Pre-Image Hash Generation
//!
//! Produces the canonical encoding of a transaction and the digest that
//! needs to be signed, without touching any key material. Useful for
//! external or air-gapped signers.

pub mod rlp;
pub mod transaction;

use serde::{Deserialize, Serialize};

use crate::crypto::CryptoBackend;
use crate::error::SignerResult;
use crate::types::{SignatureMode, TransactionFields};

pub use transaction::{
    attribute_for, TransactionEncoder, EVM_ABI_CODEC, LIQUID_CREATE, LIQUID_SCALE_CODEC,
    TRANSACTION_VERSION,
};

/// A pre-image hash with the encoding it was computed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreImageHash {
    /// Canonical transaction encoding
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub encoding: Vec<u8>,

    /// The hash to sign (32 bytes)
    #[serde(with = "crate::serde_bytes::hex32")]
    pub hash: [u8; 32],

    /// Suite whose digest produced `hash`
    pub mode: SignatureMode,
}

impl PreImageHash {
    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }
}

/// Encode `fields` and hash the result with the backend's digest
pub fn get_transaction_signing_hash(
    fields: &TransactionFields,
    backend: &dyn CryptoBackend,
) -> SignerResult<PreImageHash> {
    let encoding = TransactionEncoder::new().encode(fields)?;
    let hash = backend.hash(&encoding);
    Ok(PreImageHash {
        encoding,
        hash,
        mode: backend.mode(),
    })
}
