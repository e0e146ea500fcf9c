//! Signer Configuration
//!
//! Chain identity and signing defaults shared by the CLI, the FFI surface
//! and `SigningContext`:
//! - JSON file loading
//! - Environment variable overrides (`BCOS_SIGNER_*`)
//! - Validation of settings
//! - An optional process-wide instance

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SignerError, SignerResult};
use crate::types::SignatureMode;

pub const ENV_CHAIN_ID: &str = "BCOS_SIGNER_CHAIN_ID";
pub const ENV_GROUP_ID: &str = "BCOS_SIGNER_GROUP_ID";
pub const ENV_SM_CRYPTO: &str = "BCOS_SIGNER_SM_CRYPTO";
pub const ENV_WASM: &str = "BCOS_SIGNER_WASM";
pub const ENV_BLOCK_LIMIT: &str = "BCOS_SIGNER_BLOCK_LIMIT";

/// Signer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    pub chain_id: String,
    pub group_id: String,
    /// Signature suite used when a request does not name one
    pub signature_mode: SignatureMode,
    /// Target WASM contracts by default
    pub wasm: bool,
    /// Block limit used when a request does not carry one
    pub default_block_limit: i64,
    pub debug_logging: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            chain_id: "chain0".to_string(),
            group_id: "group0".to_string(),
            signature_mode: SignatureMode::Ecdsa,
            wasm: false,
            default_block_limit: 500,
            debug_logging: false,
        }
    }
}

impl SignerConfig {
    /// SM crypto preset with otherwise default settings
    pub fn sm() -> Self {
        Self {
            signature_mode: SignatureMode::Sm,
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> SignerResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SignerError::config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SignerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SignerError::config(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Apply `BCOS_SIGNER_*` overrides from the process environment
    pub fn apply_env(self) -> SignerResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> SignerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(chain_id) = lookup(ENV_CHAIN_ID) {
            self.chain_id = chain_id;
        }
        if let Some(group_id) = lookup(ENV_GROUP_ID) {
            self.group_id = group_id;
        }
        if let Some(sm) = lookup(ENV_SM_CRYPTO) {
            self.signature_mode = SignatureMode::from_sm_flag(parse_flag(ENV_SM_CRYPTO, &sm)?);
        }
        if let Some(wasm) = lookup(ENV_WASM) {
            self.wasm = parse_flag(ENV_WASM, &wasm)?;
        }
        if let Some(limit) = lookup(ENV_BLOCK_LIMIT) {
            self.default_block_limit = limit.trim().parse().map_err(|_| {
                SignerError::config(format!("{} must be an integer, got {:?}", ENV_BLOCK_LIMIT, limit))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings that can never produce a valid transaction
    pub fn validate(&self) -> SignerResult<()> {
        if self.chain_id.trim().is_empty() {
            return Err(SignerError::config("chain_id must not be empty"));
        }
        if self.group_id.trim().is_empty() {
            return Err(SignerError::config("group_id must not be empty"));
        }
        if self.default_block_limit < 0 {
            return Err(SignerError::config(format!(
                "default_block_limit must be non-negative, got {}",
                self.default_block_limit
            )));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> SignerResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SignerError::config(format!(
            "{} must be a boolean, got {:?}",
            key, other
        ))),
    }
}

/// Global signer configuration instance
static SIGNER_CONFIG: std::sync::OnceLock<SignerConfig> = std::sync::OnceLock::new();

/// Install the process-wide configuration
///
/// Only the first successful call installs; later calls return the
/// configuration already in place.
pub fn init_global(config: SignerConfig) -> SignerResult<&'static SignerConfig> {
    config.validate()?;
    Ok(SIGNER_CONFIG.get_or_init(|| config))
}

/// Get the process-wide configuration (defaults if never initialized)
pub fn global() -> &'static SignerConfig {
    SIGNER_CONFIG.get_or_init(SignerConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SignerConfig::default();
        assert_eq!(config.chain_id, "chain0");
        assert_eq!(config.group_id, "group0");
        assert_eq!(config.signature_mode, SignatureMode::Ecdsa);
        assert!(!config.wasm);
        assert_eq!(config.default_block_limit, 500);
        assert!(config.validate().is_ok());
        assert_eq!(SignerConfig::sm().signature_mode, SignatureMode::Sm);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SignerConfig::from_json(r#"{"group_id": "group1", "signature_mode": "sm"}"#).unwrap();
        assert_eq!(config.group_id, "group1");
        assert_eq!(config.chain_id, "chain0");
        assert_eq!(config.signature_mode, SignatureMode::Sm);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = SignerConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);

        let err = SignerConfig::from_json(r#"{"chain_id": ""}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_from_missing_file() {
        let err = SignerConfig::from_file("/nonexistent/bcos-signer.json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_CHAIN_ID, "chain9"),
            (ENV_SM_CRYPTO, "true"),
            (ENV_WASM, "1"),
            (ENV_BLOCK_LIMIT, "1200"),
        ]
        .into_iter()
        .collect();

        let config = SignerConfig::default()
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.chain_id, "chain9");
        assert_eq!(config.group_id, "group0");
        assert_eq!(config.signature_mode, SignatureMode::Sm);
        assert!(config.wasm);
        assert_eq!(config.default_block_limit, 1200);
    }

    #[test]
    fn test_bad_overrides() {
        let err = SignerConfig::default()
            .apply_overrides(|k| (k == ENV_BLOCK_LIMIT).then(|| "-5".to_string()))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);

        let err = SignerConfig::default()
            .apply_overrides(|k| (k == ENV_WASM).then(|| "maybe".to_string()))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_global_is_stable() {
        let first = global();
        let second = init_global(SignerConfig::sm()).unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
