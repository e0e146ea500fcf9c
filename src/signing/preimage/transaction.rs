//! Canonical Transaction Encoding
//!
//! Renders `TransactionFields` into the byte string that is hashed and
//! signed. The layout is a fixed-order RLP list:
//!
//! ```text
//! [version, chain_id, group_id, block_limit, nonce, to, data, abi, extra_data, attribute]
//! ```
//!
//! The signature mode is not part of the encoding; it only selects the
//! digest and curve applied afterwards.

use crate::error::{SignerError, SignerResult};
use crate::types::{SignatureMode, TransactionFields};
use crate::wallet::{parse_recipient, Recipient};

use super::rlp::{self, RlpError, RlpItem};

/// Layout version written as the first list item
pub const TRANSACTION_VERSION: u64 = 0;

/// Number of items in the encoded list
pub const FIELD_COUNT: usize = 10;

/// Call data is EVM ABI encoded
pub const EVM_ABI_CODEC: u64 = 0x1;
/// Call data is Liquid (SCALE) encoded
pub const LIQUID_SCALE_CODEC: u64 = 0x2;
/// WASM contract creation
pub const LIQUID_CREATE: u64 = 0x8;

impl From<RlpError> for SignerError {
    fn from(e: RlpError) -> Self {
        SignerError::encoding(format!("Malformed transaction encoding: {}", e))
    }
}

/// Attribute bit set for a transaction
pub fn attribute_for(fields: &TransactionFields) -> u64 {
    if fields.wasm {
        let mut attribute = LIQUID_SCALE_CODEC;
        if fields.is_deployment() {
            attribute |= LIQUID_CREATE;
        }
        attribute
    } else {
        EVM_ABI_CODEC
    }
}

/// Deterministic serializer for transaction fields
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionEncoder;

impl TransactionEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Check field invariants and parse the recipient
    pub fn validate(&self, fields: &TransactionFields) -> SignerResult<Recipient> {
        if fields.chain_id.is_empty() {
            return Err(SignerError::encoding("chain_id must not be empty"));
        }
        if fields.group_id.is_empty() {
            return Err(SignerError::encoding("group_id must not be empty"));
        }
        if fields.block_limit < 0 {
            return Err(SignerError::encoding(format!(
                "block_limit must be non-negative, got {}",
                fields.block_limit
            )));
        }
        Ok(parse_recipient(&fields.to, fields.wasm)?)
    }

    /// Render the canonical encoding
    pub fn encode(&self, fields: &TransactionFields) -> SignerResult<Vec<u8>> {
        let recipient = self.validate(fields)?;

        let items = vec![
            rlp::encode_u64(TRANSACTION_VERSION),
            rlp::encode_str(&fields.chain_id),
            rlp::encode_str(&fields.group_id),
            rlp::encode_u64(fields.block_limit as u64),
            rlp::encode_str(&fields.nonce),
            rlp::encode_bytes(&recipient.encoded_bytes()),
            rlp::encode_bytes(&fields.data),
            rlp::encode_str(&fields.abi),
            rlp::encode_bytes(&fields.extra_data),
            rlp::encode_u64(attribute_for(fields)),
        ];

        Ok(rlp::encode_list(&items))
    }

    /// Parse a canonical encoding back into fields
    ///
    /// `mode` fills in `signature_mode`, which the encoding does not carry.
    pub fn decode(&self, encoding: &[u8], mode: SignatureMode) -> SignerResult<TransactionFields> {
        let root = rlp::decode_exact(encoding)?;
        let items = root.as_list()?;
        if items.len() != FIELD_COUNT {
            return Err(SignerError::encoding(format!(
                "Expected {} transaction fields, got {}",
                FIELD_COUNT,
                items.len()
            )));
        }

        let version = scalar(&items[0])?;
        if version != TRANSACTION_VERSION {
            return Err(SignerError::encoding(format!(
                "Unsupported transaction version {}",
                version
            )));
        }

        let block_limit = i64::try_from(scalar(&items[3])?)
            .map_err(|_| SignerError::encoding("block_limit out of range"))?;

        let attribute = scalar(&items[9])?;
        let wasm = attribute & LIQUID_SCALE_CODEC != 0;

        let to_bytes = items[5].as_bytes()?;
        let to = match (to_bytes.is_empty(), wasm) {
            (true, _) => String::new(),
            (false, true) => utf8(to_bytes, "to")?,
            (false, false) => {
                let addr: [u8; 20] = to_bytes.try_into().map_err(|_| {
                    SignerError::encoding(format!(
                        "Recipient must be 20 bytes, got {}",
                        to_bytes.len()
                    ))
                })?;
                Recipient::Evm(addr).to_display_string()
            }
        };

        let fields = TransactionFields {
            chain_id: utf8(items[1].as_bytes()?, "chain_id")?,
            group_id: utf8(items[2].as_bytes()?, "group_id")?,
            to,
            data: items[6].as_bytes()?.to_vec(),
            extra_data: items[8].as_bytes()?.to_vec(),
            block_limit,
            signature_mode: mode,
            wasm,
            nonce: utf8(items[4].as_bytes()?, "nonce")?,
            abi: utf8(items[7].as_bytes()?, "abi")?,
        };

        // Re-encoding must reproduce the input byte for byte
        if attribute != attribute_for(&fields) || self.encode(&fields)? != encoding {
            return Err(SignerError::encoding("Transaction encoding is not canonical"));
        }

        Ok(fields)
    }
}

fn scalar(item: &RlpItem<'_>) -> SignerResult<u64> {
    Ok(item.as_u64()?)
}

fn utf8(bytes: &[u8], field: &str) -> SignerResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| SignerError::encoding(format!("{} is not valid UTF-8", field)))
}
