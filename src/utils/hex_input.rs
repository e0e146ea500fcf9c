//! Hex input parsing
//!
//! Payloads handed to the signer (call data, signed envelopes) are usually
//! hex strings. The payload parser accepts an optional `0x`/`0X` prefix
//! and odd-length input, in which case the first digit is a lone leading
//! nibble (`0xabc` decodes to `[0x0a, 0xbc]`). Secrets go through
//! `decode_hex_secret`, which takes no such liberty.

use zeroize::Zeroizing;

use crate::error::{ErrorCode, SignerError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexInputError {
    #[error("invalid hex character {ch:?} at position {index}")]
    InvalidCharacter { ch: char, index: usize },

    #[error("odd number of hex digits ({0})")]
    OddLength(usize),
}

impl From<HexInputError> for SignerError {
    fn from(e: HexInputError) -> Self {
        SignerError::new(ErrorCode::HexError, e.to_string())
    }
}

/// Strip an optional `0x`/`0X` prefix
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Split trimmed input into prefix length and digits
fn split_digits(s: &str) -> (usize, &str) {
    let trimmed = s.trim();
    let digits = strip_hex_prefix(trimmed);
    (trimmed.len() - digits.len(), digits)
}

/// Map a `hex` crate error back onto positions in the caller's string
///
/// `pad` is the number of digits prepended before decoding.
fn input_error(
    e: hex::FromHexError,
    prefix_len: usize,
    pad: usize,
    digits: usize,
) -> HexInputError {
    match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => HexInputError::InvalidCharacter {
            ch: c,
            index: prefix_len + index - pad,
        },
        _ => HexInputError::OddLength(digits),
    }
}

/// Decode a hex payload, tolerating a prefix and odd length
pub fn decode_hex_payload(s: &str) -> Result<Vec<u8>, HexInputError> {
    let (prefix_len, digits) = split_digits(s);

    if digits.len() % 2 == 1 {
        let padded = format!("0{}", digits);
        return hex::decode(&padded).map_err(|e| input_error(e, prefix_len, 1, digits.len()));
    }
    hex::decode(digits).map_err(|e| input_error(e, prefix_len, 0, digits.len()))
}

/// Decode secret hex into a wiped buffer
///
/// SECURITY: Bytes are written straight into a `Zeroizing` buffer, so a
/// decode that fails halfway leaves nothing behind. Odd-length input is
/// rejected rather than padded.
pub fn decode_hex_secret(s: &str) -> Result<Zeroizing<Vec<u8>>, HexInputError> {
    let (prefix_len, digits) = split_digits(s);
    if digits.len() % 2 == 1 {
        return Err(HexInputError::OddLength(digits.len()));
    }

    let mut out = Zeroizing::new(vec![0u8; digits.len() / 2]);
    hex::decode_to_slice(digits, &mut out[..])
        .map_err(|e| input_error(e, prefix_len, 0, digits.len()))?;
    Ok(out)
}
