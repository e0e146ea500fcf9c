//! Recipient Address Validation
//!
//! A transaction's `to` field takes one of three shapes:
//! - empty: contract deployment
//! - EVM: 20-byte hex address, `0x` optional, any letter case
//! - WASM: absolute contract path such as `/apps/hello_world`

use crate::error::SignerError;

/// Longest accepted WASM contract path
pub const MAX_WASM_PATH_LEN: usize = 255;

/// Parsed recipient of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Contract deployment
    Deploy,
    /// EVM contract or account address
    Evm([u8; 20]),
    /// WASM contract path
    WasmPath(String),
}

impl Recipient {
    /// Bytes written into the canonical encoding
    pub fn encoded_bytes(&self) -> Vec<u8> {
        match self {
            Self::Deploy => Vec::new(),
            Self::Evm(addr) => addr.to_vec(),
            Self::WasmPath(path) => path.as_bytes().to_vec(),
        }
    }

    /// Render back into the textual form accepted by `parse_recipient`
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Deploy => String::new(),
            Self::Evm(addr) => format!("0x{}", hex::encode(addr)),
            Self::WasmPath(path) => path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must be 40 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("address contains non-hex character {0:?}")]
    InvalidCharacter(char),

    #[error("wasm contract path must start with '/': {0:?}")]
    RelativePath(String),

    #[error("wasm contract path contains an invalid character {0:?}")]
    InvalidPathCharacter(char),

    #[error("wasm contract path exceeds {MAX_WASM_PATH_LEN} bytes")]
    PathTooLong,
}

impl From<AddressError> for SignerError {
    fn from(e: AddressError) -> Self {
        SignerError::encoding(format!("Invalid recipient: {}", e))
    }
}

/// Parse a recipient according to the contract flavour
pub fn parse_recipient(to: &str, wasm: bool) -> Result<Recipient, AddressError> {
    if to.is_empty() {
        return Ok(Recipient::Deploy);
    }

    if wasm {
        parse_wasm_path(to).map(Recipient::WasmPath)
    } else {
        parse_evm_address(to).map(Recipient::Evm)
    }
}

/// Parse a 20-byte hex address
pub fn parse_evm_address(address: &str) -> Result<[u8; 20], AddressError> {
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);

    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidCharacter(bad));
    }
    if digits.len() != 40 {
        return Err(AddressError::InvalidLength(digits.len()));
    }

    let mut out = [0u8; 20];
    hex::decode_to_slice(digits, &mut out)
        .map_err(|_| AddressError::InvalidLength(digits.len()))?;
    Ok(out)
}

fn parse_wasm_path(path: &str) -> Result<String, AddressError> {
    if !path.starts_with('/') {
        return Err(AddressError::RelativePath(path.to_string()));
    }
    if path.len() > MAX_WASM_PATH_LEN {
        return Err(AddressError::PathTooLong);
    }
    if let Some(bad) = path
        .chars()
        .find(|c| !(c.is_ascii_graphic()) || *c == '\\')
    {
        return Err(AddressError::InvalidPathCharacter(bad));
    }
    Ok(path.to_string())
}
