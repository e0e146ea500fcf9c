//! Shared types for the signer
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization and FFI compatibility.

use serde::{Deserialize, Serialize};

// =============================================================================
// Crypto Suite
// =============================================================================

/// Signature suite used for hashing and signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMode {
    /// secp256k1 ECDSA with Keccak-256
    #[default]
    Ecdsa,
    /// SM2 with SM3 (national standard suite)
    Sm,
}

impl SignatureMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ecdsa => "ecdsa",
            Self::Sm => "sm",
        }
    }

    /// Expected raw private key size in bytes
    pub fn private_key_len(&self) -> usize {
        match self {
            Self::Ecdsa => 32,
            Self::Sm => 32,
        }
    }

    /// Size of the signature envelope produced by the suite
    pub fn signature_len(&self) -> usize {
        match self {
            Self::Ecdsa => 65, // r || s || v
            Self::Sm => 128,   // r || s || public key
        }
    }

    /// Map the `sm_crypto` flag used by SDK configuration files
    pub fn from_sm_flag(sm_crypto: bool) -> Self {
        if sm_crypto {
            Self::Sm
        } else {
            Self::Ecdsa
        }
    }
}

impl std::str::FromStr for SignatureMode {
    type Err = crate::error::SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ecdsa" | "secp256k1" => Ok(Self::Ecdsa),
            "sm" | "sm2" | "gm" => Ok(Self::Sm),
            other => Err(crate::error::SignerError::invalid_input(format!(
                "Unknown signature mode: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SignatureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Transaction Types
// =============================================================================

/// Logical fields of a transaction before signing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFields {
    pub chain_id: String,
    pub group_id: String,
    /// Recipient; empty for contract deployment
    #[serde(default)]
    pub to: String,
    /// Call data or deployment bytecode
    #[serde(default, with = "crate::serde_bytes::hex_vec")]
    pub data: Vec<u8>,
    #[serde(default, with = "crate::serde_bytes::hex_vec")]
    pub extra_data: Vec<u8>,
    /// Highest block number at which the transaction is still valid
    pub block_limit: i64,
    #[serde(default)]
    pub signature_mode: SignatureMode,
    /// Target a WASM (Liquid) contract instead of an EVM contract
    #[serde(default)]
    pub wasm: bool,
    #[serde(default)]
    pub nonce: String,
    /// Contract ABI, only meaningful for WASM deployments
    #[serde(default)]
    pub abi: String,
}

impl TransactionFields {
    pub fn new(
        chain_id: impl Into<String>,
        group_id: impl Into<String>,
        to: impl Into<String>,
        data: Vec<u8>,
        block_limit: i64,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            group_id: group_id.into(),
            to: to.into(),
            data,
            extra_data: Vec::new(),
            block_limit,
            signature_mode: SignatureMode::Ecdsa,
            wasm: false,
            nonce: String::new(),
            abi: String::new(),
        }
    }

    pub fn with_extra_data(mut self, extra_data: impl Into<Vec<u8>>) -> Self {
        self.extra_data = extra_data.into();
        self
    }

    pub fn with_signature_mode(mut self, mode: SignatureMode) -> Self {
        self.signature_mode = mode;
        self
    }

    pub fn with_wasm(mut self, wasm: bool) -> Self {
        self.wasm = wasm;
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = nonce.into();
        self
    }

    pub fn with_abi(mut self, abi: impl Into<String>) -> Self {
        self.abi = abi.into();
        self
    }

    /// True when the transaction deploys a new contract
    pub fn is_deployment(&self) -> bool {
        self.to.is_empty()
    }
}

/// Result of a successful signing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Transaction hash (digest of the canonical encoding)
    #[serde(with = "crate::serde_bytes::hex32")]
    pub hash: [u8; 32],
    /// Canonical encoding that was hashed and signed
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub canonical_encoding: Vec<u8>,
    /// Signature envelope including recovery metadata
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub signature: Vec<u8>,
    /// Broadcast-ready payload: encoding followed by the signature envelope
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub signed_tx: Vec<u8>,
    /// Account address of the signing key
    #[serde(with = "crate::serde_bytes::hex20")]
    pub sender: [u8; 20],
    pub signature_mode: SignatureMode,
}

impl SignedTransaction {
    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }

    pub fn signed_tx_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.signed_tx))
    }

    pub fn sender_hex(&self) -> String {
        format!("0x{}", hex::encode(self.sender))
    }
}

// =============================================================================
// API Response Wrapper
// =============================================================================

/// Standard API response wrapper for FFI and CLI output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<crate::error::SignerError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: crate::error::SignerError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed","details":null}}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_mode_properties() {
        assert_eq!(SignatureMode::default(), SignatureMode::Ecdsa);
        assert_eq!(SignatureMode::Ecdsa.private_key_len(), 32);
        assert_eq!(SignatureMode::Sm.signature_len(), 128);
        assert_eq!(SignatureMode::from_sm_flag(true), SignatureMode::Sm);
        assert_eq!("SM2".parse::<SignatureMode>().unwrap(), SignatureMode::Sm);
        assert_eq!("secp256k1".parse::<SignatureMode>().unwrap(), SignatureMode::Ecdsa);
        let err = "ed25519".parse::<SignatureMode>().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidInput);
    }

    #[test]
    fn test_fields_json_defaults() {
        let json = r#"{"chain_id":"chain0","group_id":"group0","to":"","data":"0xabc","block_limit":1000}"#;
        let fields: TransactionFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.data, vec![0x0a, 0xbc]);
        assert!(fields.extra_data.is_empty());
        assert_eq!(fields.signature_mode, SignatureMode::Ecdsa);
        assert!(fields.is_deployment());
        assert!(!fields.wasm);
    }

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::ok("test_data".to_string());
        let json = response.to_json();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("test_data"));
        assert!(!json.contains("error"));
    }
}
