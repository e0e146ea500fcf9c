//! Transaction Compiler
//!
//! Compiles a signature and its canonical encoding into the broadcast-ready
//! envelope, and takes envelopes apart again for verification.
//!
//! Envelope layout: `canonical_encoding || RLP([hash, signature])`

use serde::{Deserialize, Serialize};

use crate::crypto::CryptoBackend;
use crate::error::{SignerError, SignerResult};
use crate::signing::preimage::rlp;
use crate::signing::preimage::TransactionEncoder;
use crate::types::{SignatureMode, SignedTransaction, TransactionFields};

/// Build a `SignedTransaction` from an encoding and a signature over its hash
///
/// The signer's address is recovered from the signature, so a signature
/// that does not match `hash` fails here rather than on chain.
pub fn compile_signed_transaction(
    encoding: &[u8],
    hash: [u8; 32],
    signature: Vec<u8>,
    backend: &dyn CryptoBackend,
) -> SignerResult<SignedTransaction> {
    let mode = backend.mode();
    if signature.len() != mode.signature_len() {
        return Err(SignerError::signing_failed(format!(
            "{} signature must be {} bytes, got {}",
            mode,
            mode.signature_len(),
            signature.len()
        )));
    }

    let public_key = backend
        .recover(&hash, &signature)
        .map_err(|e| SignerError::signing_failed(format!("Signature does not verify: {}", e)))?;
    let sender = backend.address(&public_key);

    let mut signed_tx = encoding.to_vec();
    signed_tx.extend_from_slice(&rlp::encode_list(&[
        rlp::encode_bytes(&hash),
        rlp::encode_bytes(&signature),
    ]));

    Ok(SignedTransaction {
        hash,
        canonical_encoding: encoding.to_vec(),
        signature,
        signed_tx,
        sender,
        signature_mode: mode,
    })
}

/// Parts of a signed transaction envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedTransaction {
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub canonical_encoding: Vec<u8>,
    #[serde(with = "crate::serde_bytes::hex32")]
    pub hash: [u8; 32],
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub signature: Vec<u8>,
}

/// Split an envelope into encoding, hash and signature
pub fn decode_signed_transaction(signed_tx: &[u8]) -> SignerResult<DecodedTransaction> {
    let (_, tail) = rlp::decode_item(signed_tx)
        .map_err(|e| SignerError::invalid_input(format!("Malformed transaction encoding: {}", e)))?;
    let split = signed_tx.len() - tail.len();

    let envelope = rlp::decode_exact(tail)
        .map_err(|e| SignerError::invalid_input(format!("Malformed signature envelope: {}", e)))?;
    let parts = envelope
        .as_list()
        .map_err(|e| SignerError::invalid_input(format!("Malformed signature envelope: {}", e)))?;

    let [hash_item, sig_item] = parts else {
        return Err(SignerError::invalid_input(format!(
            "Signature envelope must hold 2 items, got {}",
            parts.len()
        )));
    };

    let hash: [u8; 32] = hash_item
        .as_bytes()
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| SignerError::invalid_input("Transaction hash must be 32 bytes"))?;
    let signature = sig_item
        .as_bytes()
        .map_err(|e| SignerError::invalid_input(format!("Malformed signature: {}", e)))?
        .to_vec();

    Ok(DecodedTransaction {
        canonical_encoding: signed_tx[..split].to_vec(),
        hash,
        signature,
    })
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedTransaction {
    pub fields: TransactionFields,
    #[serde(with = "crate::serde_bytes::hex32")]
    pub hash: [u8; 32],
    #[serde(with = "crate::serde_bytes::hex20")]
    pub sender: [u8; 20],
    pub signature_mode: SignatureMode,
}

/// Check the hash binding and signature of an envelope
///
/// Any mismatch is reported as `InvalidInput`.
pub fn verify_signed_transaction(
    signed_tx: &[u8],
    backend: &dyn CryptoBackend,
) -> SignerResult<VerifiedTransaction> {
    let decoded = decode_signed_transaction(signed_tx)?;

    if backend.hash(&decoded.canonical_encoding) != decoded.hash {
        return Err(SignerError::invalid_input(
            "Transaction hash does not match its encoding",
        ));
    }

    let mode = backend.mode();
    if decoded.signature.len() != mode.signature_len() {
        return Err(SignerError::invalid_input(format!(
            "{} signature must be {} bytes, got {}",
            mode,
            mode.signature_len(),
            decoded.signature.len()
        )));
    }

    let public_key = backend
        .recover(&decoded.hash, &decoded.signature)
        .map_err(|e| SignerError::invalid_input(format!("Signature does not verify: {}", e)))?;

    let fields = TransactionEncoder::new()
        .decode(&decoded.canonical_encoding, mode)
        .map_err(|e| SignerError::invalid_input(e.message))?;

    Ok(VerifiedTransaction {
        fields,
        hash: decoded.hash,
        sender: backend.address(&public_key),
        signature_mode: mode,
    })
}
