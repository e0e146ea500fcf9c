//! Utilities Module
//!
//! Common utilities used across the crate.

pub mod hex_input;
pub mod logging;
pub mod signer_config;

pub use hex_input::{decode_hex_payload, strip_hex_prefix};
pub use signer_config::SignerConfig;
