//! Key Material
//!
//! Derives key pairs from raw private keys.
//!
//! SECURITY: Private key bytes live in `Zeroizing` buffers and are wiped
//! on drop. Every `KeyPair` holds a `KeyLease` which is returned to its
//! tracker exactly once, whichever way the owning call exits.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::crypto::{backend_for, CryptoBackend, PublicKeyBytes};
use crate::error::{ErrorCode, SignerError, SignerResult};
use crate::types::SignatureMode;
use crate::utils::hex_input::{decode_hex_secret, HexInputError};

use super::tracker::{KeyLease, KeyTracker, NoopTracker};

/// Raw private key owned by the caller
#[derive(Clone)]
pub struct PrivateKey(Zeroizing<Vec<u8>>);

impl PrivateKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    /// Parse a hex-encoded key (`0x` optional)
    ///
    /// An odd digit count is a key with a digit missing and fails with
    /// `InvalidKeyLength`. Even counts of the wrong size are caught by
    /// `KeyMaterial::derive` with the same code.
    pub fn from_hex(s: &str) -> SignerResult<Self> {
        match decode_hex_secret(s) {
            Ok(bytes) => Ok(Self(bytes)),
            Err(HexInputError::OddLength(digits)) => Err(SignerError::new(
                ErrorCode::InvalidKeyLength,
                format!("Private key must be an even number of hex digits, got {}", digits),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.as_slice()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("len", &self.0.len())
            .finish()
    }
}

/// Key pair derived from a private key
pub struct KeyPair {
    mode: SignatureMode,
    secret: Zeroizing<Vec<u8>>,
    public_key: PublicKeyBytes,
    address: [u8; 20],
    lease: KeyLease,
}

impl KeyPair {
    pub fn mode(&self) -> SignatureMode {
        self.mode
    }

    pub fn public_key(&self) -> &PublicKeyBytes {
        &self.public_key
    }

    /// Key pair identifier: the account address
    pub fn address(&self) -> [u8; 20] {
        self.address
    }

    pub fn address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.address))
    }

    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key))
    }

    pub fn lease_id(&self) -> u64 {
        self.lease.id()
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("mode", &self.mode)
            .field("address", &self.address_hex())
            .field("lease", &self.lease)
            .finish()
    }
}

/// Derives key pairs for one backend
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    backend: Arc<dyn CryptoBackend>,
    tracker: Arc<dyn KeyTracker>,
}

impl KeyMaterial {
    pub fn new(backend: Arc<dyn CryptoBackend>) -> Self {
        Self {
            backend,
            tracker: Arc::new(NoopTracker),
        }
    }

    pub fn for_mode(mode: SignatureMode) -> Self {
        Self::new(backend_for(mode))
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn KeyTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn backend(&self) -> &Arc<dyn CryptoBackend> {
        &self.backend
    }

    pub fn mode(&self) -> SignatureMode {
        self.backend.mode()
    }

    /// Derive a key pair from raw private key bytes
    pub fn derive(&self, private_key: &[u8]) -> SignerResult<KeyPair> {
        let expected = self.backend.private_key_len();
        if private_key.len() != expected {
            return Err(SignerError::invalid_key_length(expected, private_key.len())
                .with_details(format!("mode={}", self.mode())));
        }

        let lease = KeyLease::acquire(self.tracker.clone())
            .map_err(|e| SignerError::resource(format!("Failed to allocate key pair: {}", e)))?;

        let public_key = self.backend.public_key(private_key)?;
        let address = self.backend.address(&public_key);

        Ok(KeyPair {
            mode: self.mode(),
            secret: Zeroizing::new(private_key.to_vec()),
            public_key,
            address,
            lease,
        })
    }

    /// Draw a fresh private key from the OS RNG and derive its key pair
    pub fn generate(&self) -> SignerResult<(PrivateKey, KeyPair)> {
        // Out-of-range scalars are astronomically rare; a few retries suffice.
        for _ in 0..8 {
            let mut bytes = Zeroizing::new(vec![0u8; self.backend.private_key_len()]);
            OsRng.fill_bytes(bytes.as_mut_slice());

            match self.derive(&bytes) {
                Ok(pair) => return Ok((PrivateKey::from_bytes(bytes.to_vec()), pair)),
                Err(e) if e.code == ErrorCode::InvalidPrivateKey => continue,
                Err(e) => return Err(e),
            }
        }
        Err(SignerError::internal("Failed to generate a valid private key"))
    }
}

/// Derive a key pair with the default backend for `mode`
pub fn derive_keypair(private_key: &[u8], mode: SignatureMode) -> SignerResult<KeyPair> {
    KeyMaterial::for_mode(mode).derive(private_key)
}
