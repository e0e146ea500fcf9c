//! BCOS Signer Library
//!
//! Offline construction and signing of FISCO BCOS transactions.
//!
//! # Architecture
//!
//! The signing pipeline has three stages:
//! - **wallet**: Key material. Derives key pairs from raw private keys
//! - **signing**: Canonical transaction encoding, pre-image hashes and
//!   signed-envelope compilation/verification
//! - **tx**: Signs encodings and orchestrates the pipeline (`SigningContext`)
//!
//! Supporting modules:
//! - **crypto**: secp256k1/Keccak-256 and SM2/SM3 backends
//! - **utils**: Hex input parsing, logging, configuration
//! - **ffi**: C-ABI exports
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `bcos_signer_free_string`)
//!
//! # Security
//!
//! This crate uses `zeroize` to securely clear sensitive data from memory.
//! Private keys are zeroed when dropped, and every derived key pair is
//! released exactly once, whichever way the signing call exits.
//!
//! # Example
//!
//! ```rust,ignore
//! use bcos_signer::{create_signed_transaction, TransactionFields};
//!
//! let fields = TransactionFields::new("chain0", "group0", "0x…", call_data, 1000);
//! let signed = create_signed_transaction(&fields, &private_key)?;
//! println!("{} {}", signed.hash_hex(), signed.signed_tx_hex());
//! ```

pub mod crypto;
pub mod error;
pub mod ffi;
pub mod serde_bytes;
pub mod signing;
pub mod tx;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use error::{ErrorCode, SignerError, SignerResult};
pub use types::*;

pub use crypto::{keccak256, sm3, CryptoBackend};
pub use signing::{
    decode_signed_transaction, verify_signed_transaction, TransactionEncoder,
};
pub use tx::{create_signed_transaction, SigningContext, SigningStage, TransactionSigner};
pub use utils::SignerConfig;
pub use wallet::{derive_keypair, KeyMaterial, KeyPair, PrivateKey};

// Re-export FFI functions at crate root
pub use ffi::{
    bcos_signer_create_signed_transaction, bcos_signer_derive_keypair, bcos_signer_free_string,
    bcos_signer_verify_signed_transaction,
};
