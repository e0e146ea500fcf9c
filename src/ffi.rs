//! FFI Layer
//!
//! All C-ABI exports are defined here. This is the ONLY file that should
//! contain `extern "C"` functions. All functions follow a consistent pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `bcos_signer_free_string`)
//!
//! Error handling: All functions return JSON with `success` field.
//! On error, `success: false` and `error` object is populated.
//!
//! Fields a request leaves out are taken from the process-wide
//! `SignerConfig` (see `utils::signer_config::global`).

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::backend_for;
use crate::error::{SignerError, SignerResult};
use crate::signing::{verify_signed_transaction, VerifiedTransaction};
use crate::tx::SigningContext;
use crate::types::*;
use crate::utils::hex_input::decode_hex_payload;
use crate::utils::signer_config;
use crate::wallet::{derive_keypair, PrivateKey};

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any bcos_signer_* function
///
/// # Safety
/// The pointer must have been returned by a bcos_signer_* function
#[unsafe(no_mangle)]
pub extern "C" fn bcos_signer_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Convert C string to Rust string, returning error JSON if invalid
fn parse_input<'a>(input: *const c_char) -> Result<&'a str, *mut c_char> {
    if input.is_null() {
        return Err(error_response(SignerError::invalid_input("Null input pointer")));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    c_str
        .to_str()
        .map_err(|_| error_response(SignerError::invalid_input("Invalid UTF-8 string")))
}

fn parse_request<'de, T: Deserialize<'de>>(json: &'de str) -> Result<T, *mut c_char> {
    serde_json::from_str(json).map_err(|e| {
        error_response(SignerError::from(e).with_details("Invalid request JSON"))
    })
}

/// Create a success response JSON string
fn success_response<T: Serialize>(data: T) -> *mut c_char {
    let response = ApiResponse::ok(data);
    string_to_ptr(response.to_json())
}

/// Create an error response JSON string
fn error_response(error: SignerError) -> *mut c_char {
    let response: ApiResponse<()> = ApiResponse::err(error);
    string_to_ptr(response.to_json())
}

fn respond<T: Serialize>(result: SignerResult<T>) -> *mut c_char {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_response(e),
    }
}

/// Convert Rust string to C string pointer
fn string_to_ptr(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        // Last resort: return a minimal error
        Err(_) => c"{\"success\":false,\"error\":{\"code\":\"internal\",\"message\":\"String conversion failed\"}}"
            .to_owned()
            .into_raw(),
    }
}

fn resolve_mode(mode: Option<SignatureMode>, sm_crypto: Option<bool>) -> SignatureMode {
    mode.or_else(|| sm_crypto.map(SignatureMode::from_sm_flag))
        .unwrap_or(signer_config::global().signature_mode)
}

// =============================================================================
// Transaction Signing
// =============================================================================

#[derive(Deserialize)]
struct SignRequest {
    private_key: String,
    #[serde(default)]
    chain_id: Option<String>,
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    to: String,
    /// Hex call data (`0x` optional, odd length allowed)
    #[serde(default)]
    data: String,
    /// Free-form text carried verbatim
    #[serde(default)]
    extra_data: String,
    #[serde(default)]
    block_limit: Option<i64>,
    #[serde(default)]
    signature_mode: Option<SignatureMode>,
    #[serde(default)]
    sm_crypto: Option<bool>,
    #[serde(default)]
    wasm: Option<bool>,
    #[serde(default)]
    nonce: String,
    #[serde(default)]
    abi: String,
}

fn sign_request(request: SignRequest) -> SignerResult<SignedTransaction> {
    let private_key = PrivateKey::from_hex(&Zeroizing::new(request.private_key))?;

    let mut config = signer_config::global().clone();
    config.signature_mode = resolve_mode(request.signature_mode, request.sm_crypto);
    let context = SigningContext::new(config);

    let config = context.config();
    let fields = TransactionFields {
        chain_id: request.chain_id.unwrap_or_else(|| config.chain_id.clone()),
        group_id: request.group_id.unwrap_or_else(|| config.group_id.clone()),
        to: request.to,
        data: decode_hex_payload(&request.data)?,
        extra_data: request.extra_data.into_bytes(),
        block_limit: request.block_limit.unwrap_or(config.default_block_limit),
        signature_mode: config.signature_mode,
        wasm: request.wasm.unwrap_or(config.wasm),
        nonce: request.nonce,
        abi: request.abi,
    };

    context.create_signed_transaction(&fields, private_key.as_bytes())
}

/// Create a signed transaction
///
/// # Input
/// ```json
/// {
///   "private_key": "0x...",
///   "group_id": "group0",
///   "chain_id": "chain0",
///   "to": "0x...",
///   "data": "0x...",
///   "extra_data": "",
///   "block_limit": 1000,
///   "sm_crypto": false
/// }
/// ```
///
/// # Output
/// ```json
/// {
///   "success": true,
///   "data": { "hash": "0x...", "signed_tx": "0x...", "sender": "0x...", ... }
/// }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn bcos_signer_create_signed_transaction(input: *const c_char) -> *mut c_char {
    let json_str = match parse_input(input) {
        Ok(s) => s,
        Err(ptr) => return ptr,
    };

    let request: SignRequest = match parse_request(json_str) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    respond(sign_request(request))
}

// =============================================================================
// Key Operations
// =============================================================================

#[derive(Deserialize)]
struct DeriveRequest {
    private_key: String,
    #[serde(default)]
    signature_mode: Option<SignatureMode>,
    #[serde(default)]
    sm_crypto: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyPairInfo {
    pub address: String,
    pub public_key: String,
    pub signature_mode: SignatureMode,
}

fn derive_request(request: DeriveRequest) -> SignerResult<KeyPairInfo> {
    let private_key = PrivateKey::from_hex(&Zeroizing::new(request.private_key))?;
    let mode = resolve_mode(request.signature_mode, request.sm_crypto);
    let pair = derive_keypair(private_key.as_bytes(), mode)?;
    Ok(KeyPairInfo {
        address: pair.address_hex(),
        public_key: pair.public_key_hex(),
        signature_mode: mode,
    })
}

/// Derive the address and public key of a private key
///
/// # Input
/// ```json
/// { "private_key": "0x...", "signature_mode": "sm" }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "address": "0x...", "public_key": "0x...", "signature_mode": "sm" } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn bcos_signer_derive_keypair(input: *const c_char) -> *mut c_char {
    let json_str = match parse_input(input) {
        Ok(s) => s,
        Err(ptr) => return ptr,
    };

    let request: DeriveRequest = match parse_request(json_str) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    respond(derive_request(request))
}

// =============================================================================
// Verification
// =============================================================================

#[derive(Deserialize)]
struct VerifyRequest {
    signed_tx: String,
    #[serde(default)]
    signature_mode: Option<SignatureMode>,
    #[serde(default)]
    sm_crypto: Option<bool>,
}

fn verify_request(request: VerifyRequest) -> SignerResult<VerifiedTransaction> {
    let signed_tx = decode_hex_payload(&request.signed_tx)?;
    let backend = backend_for(resolve_mode(request.signature_mode, request.sm_crypto));
    verify_signed_transaction(&signed_tx, backend.as_ref())
}

/// Verify a signed transaction and recover its sender
///
/// # Input
/// ```json
/// { "signed_tx": "0x...", "sm_crypto": false }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "fields": {...}, "hash": "0x...", "sender": "0x..." } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn bcos_signer_verify_signed_transaction(input: *const c_char) -> *mut c_char {
    let json_str = match parse_input(input) {
        Ok(s) => s,
        Err(ptr) => return ptr,
    };

    let request: VerifyRequest = match parse_request(json_str) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    respond(verify_request(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn call(f: extern "C" fn(*const c_char) -> *mut c_char, json: &str) -> Value {
        let input = CString::new(json).unwrap();
        let out = f(input.as_ptr());
        assert!(!out.is_null());
        let text = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
        bcos_signer_free_string(out);
        serde_json::from_str(&text).unwrap()
    }

    fn key_hex() -> String {
        format!("0x{}", "01".repeat(32))
    }

    #[test]
    fn test_sign_and_verify() {
        let request = serde_json::json!({
            "private_key": key_hex(),
            "group_id": "group0",
            "chain_id": "chain0",
            "to": "0x1234567890abcdef1234567890abcdef12345678",
            "data": "0xabc",
            "block_limit": 1000,
        });
        let signed = call(bcos_signer_create_signed_transaction, &request.to_string());
        assert_eq!(signed["success"], true);
        let hash = signed["data"]["hash"].as_str().unwrap();
        assert_eq!(hash.len(), 66);

        let verify = serde_json::json!({ "signed_tx": signed["data"]["signed_tx"] });
        let verified = call(bcos_signer_verify_signed_transaction, &verify.to_string());
        assert_eq!(verified["success"], true);
        assert_eq!(verified["data"]["hash"], hash);
        assert_eq!(verified["data"]["sender"], signed["data"]["sender"]);
        assert_eq!(verified["data"]["fields"]["data"], "0x0abc");
    }

    #[test]
    fn test_sm_flag() {
        let request = serde_json::json!({
            "private_key": key_hex(),
            "data": "0x60",
            "sm_crypto": true,
        });
        let signed = call(bcos_signer_create_signed_transaction, &request.to_string());
        assert_eq!(signed["data"]["signature_mode"], "sm");
    }

    #[test]
    fn test_short_key_error() {
        let request = serde_json::json!({ "private_key": "0x0102", "data": "0x" });
        let out = call(bcos_signer_create_signed_transaction, &request.to_string());
        assert_eq!(out["success"], false);
        assert_eq!(out["error"]["code"], "invalid_key_length");
    }

    #[test]
    fn test_key_missing_a_digit() {
        let truncated = &key_hex()[..65];
        let request = serde_json::json!({ "private_key": truncated, "data": "0x" });
        let out = call(bcos_signer_create_signed_transaction, &request.to_string());
        assert_eq!(out["success"], false);
        assert_eq!(out["error"]["code"], "invalid_key_length");

        let request = serde_json::json!({ "private_key": truncated });
        let out = call(bcos_signer_derive_keypair, &request.to_string());
        assert_eq!(out["error"]["code"], "invalid_key_length");
    }

    #[test]
    fn test_verify_rejects_deep_nesting() {
        let mut nested = crate::signing::preimage::rlp::encode_list(&[]);
        for _ in 0..64 {
            nested = crate::signing::preimage::rlp::encode_list(&[nested]);
        }
        let request = serde_json::json!({ "signed_tx": hex::encode(&nested) });
        let out = call(bcos_signer_verify_signed_transaction, &request.to_string());
        assert_eq!(out["success"], false);
        assert_eq!(out["error"]["code"], "invalid_input");
    }

    #[test]
    fn test_derive_keypair() {
        let request = serde_json::json!({ "private_key": key_hex(), "signature_mode": "ecdsa" });
        let out = call(bcos_signer_derive_keypair, &request.to_string());
        assert_eq!(out["success"], true);
        assert_eq!(out["data"]["address"].as_str().unwrap().len(), 42);
        assert_eq!(out["data"]["public_key"].as_str().unwrap().len(), 130);
    }

    #[test]
    fn test_bad_input() {
        let out = call(bcos_signer_derive_keypair, "{not json");
        assert_eq!(out["error"]["code"], "json_error");

        let out = call(bcos_signer_verify_signed_transaction, r#"{"signed_tx": "0x00"}"#);
        assert_eq!(out["error"]["code"], "invalid_input");

        let out = bcos_signer_derive_keypair(std::ptr::null());
        let text = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
        bcos_signer_free_string(out);
        assert!(text.contains("invalid_input"));
    }
}
