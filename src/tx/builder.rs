//! Transaction Builder
//!
//! `SigningContext` runs the full pipeline for one call:
//!
//! ```text
//! Init --derive--> (key pair) --encode--> Encoded --sign--> Signed
//!   \__________________________\____________________\__> Failed
//! ```
//!
//! A context holds configuration and stateless components only, so one
//! instance can be shared between threads. Each call owns its key pair,
//! which is released before the call returns.

use std::fmt;
use std::sync::Arc;

use crate::crypto::{backend_for, CryptoBackend};
use crate::error::{SignerError, SignerResult};
use crate::signing::TransactionEncoder;
use crate::types::{SignedTransaction, TransactionFields};
use crate::utils::signer_config::SignerConfig;
use crate::wallet::{KeyMaterial, KeyTracker};
use crate::{log_debug, log_warn};

use super::signer::TransactionSigner;

const MODULE: &str = "tx::builder";

/// Progress of one signing call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStage {
    Init,
    Encoded,
    Signed,
    Failed,
}

impl fmt::Display for SigningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Encoded => "encoded",
            Self::Signed => "signed",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Configured pipeline: key material, encoder and signer for one suite
#[derive(Debug, Clone)]
pub struct SigningContext {
    config: SignerConfig,
    keys: KeyMaterial,
    encoder: TransactionEncoder,
    signer: TransactionSigner,
}

impl SigningContext {
    /// Context using the default backend for `config.signature_mode`
    pub fn new(config: SignerConfig) -> Self {
        let backend = backend_for(config.signature_mode);
        Self::with_backend(config, backend)
    }

    /// Context using an explicit backend
    pub fn with_backend(mut config: SignerConfig, backend: Arc<dyn CryptoBackend>) -> Self {
        config.signature_mode = backend.mode();
        Self {
            config,
            keys: KeyMaterial::new(backend.clone()),
            encoder: TransactionEncoder::new(),
            signer: TransactionSigner::new(backend),
        }
    }

    /// Route key pair allocation through `tracker`
    pub fn with_tracker(mut self, tracker: Arc<dyn KeyTracker>) -> Self {
        self.keys = self.keys.with_tracker(tracker);
        self
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    pub fn key_material(&self) -> &KeyMaterial {
        &self.keys
    }

    /// Transaction fields pre-filled from the configuration
    pub fn transaction(&self, to: impl Into<String>, data: Vec<u8>) -> TransactionFields {
        TransactionFields::new(
            self.config.chain_id.clone(),
            self.config.group_id.clone(),
            to,
            data,
            self.config.default_block_limit,
        )
        .with_signature_mode(self.config.signature_mode)
        .with_wasm(self.config.wasm)
    }

    /// Derive, encode and sign
    ///
    /// Returns the transaction hash and the signed envelope, or the first
    /// error hit. The stage reached is recorded in the error details.
    pub fn create_signed_transaction(
        &self,
        fields: &TransactionFields,
        private_key: &[u8],
    ) -> SignerResult<SignedTransaction> {
        let mut stage = SigningStage::Init;
        let result = self.run(fields, private_key, &mut stage);

        match &result {
            Ok(signed) => {
                log_debug!(
                    MODULE,
                    "Transaction signed",
                    stage = stage,
                    mode = signed.signature_mode,
                    tx_hash = signed.hash_hex(),
                    sender = signed.sender_hex(),
                );
            }
            Err(e) => {
                log_debug!(MODULE, "Signing failed", stage = stage, code = format!("{:?}", e.code));
            }
        }

        result.map_err(|e| annotate(e, stage))
    }

    fn run(
        &self,
        fields: &TransactionFields,
        private_key: &[u8],
        stage: &mut SigningStage,
    ) -> SignerResult<SignedTransaction> {
        let key_pair = self.keys.derive(private_key)?;

        if fields.signature_mode != self.signer.mode() {
            log_warn!(
                MODULE,
                "Signature mode mismatch",
                requested = fields.signature_mode,
                configured = self.signer.mode(),
            );
            return Err(SignerError::encoding(format!(
                "Transaction requests {} signing but context is {}",
                fields.signature_mode,
                self.signer.mode()
            )));
        }

        let encoding = self.encoder.encode(fields)?;
        *stage = SigningStage::Encoded;
        log_debug!(MODULE, "Transaction encoded", stage = stage, bytes = encoding.len());

        let signed = self.signer.sign(key_pair, &encoding)?;
        *stage = SigningStage::Signed;
        Ok(signed)
    }
}

fn annotate(error: SignerError, reached: SigningStage) -> SignerError {
    let stage = format!("stage={} failed_at={}", SigningStage::Failed, reached);
    let details = match &error.details {
        Some(existing) => format!("{} {}", existing, stage),
        None => stage,
    };
    error.with_details(details)
}

/// Sign `fields` with the default backend for `fields.signature_mode`
pub fn create_signed_transaction(
    fields: &TransactionFields,
    private_key: &[u8],
) -> SignerResult<SignedTransaction> {
    let config = SignerConfig {
        chain_id: fields.chain_id.clone(),
        group_id: fields.group_id.clone(),
        signature_mode: fields.signature_mode,
        wasm: fields.wasm,
        ..SignerConfig::default()
    };
    SigningContext::new(config).create_signed_transaction(fields, private_key)
}
