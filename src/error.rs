//! Unified error types for the signer
//!
//! Every fallible operation returns a `SignerResult`. Errors carry a
//! stable `ErrorCode` so the FFI layer and the CLI can report them
//! without string matching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all signer operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl SignerError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_key_length(expected: usize, actual: usize) -> Self {
        Self::new(
            ErrorCode::InvalidKeyLength,
            format!("Private key must be {} bytes, got {}", expected, actual),
        )
    }

    pub fn invalid_private_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPrivateKey, msg)
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::EncodingError, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailure, msg)
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for SignerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SignerError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Key material
    InvalidKeyLength,
    InvalidPrivateKey,

    // Pipeline
    EncodingError,
    SigningFailure,
    ResourceError,

    // Input errors
    InvalidInput,
    HexError,
    JsonError,
    ConfigError,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Process exit code used by the CLI.
    ///
    /// Malformed keys, encoding and signing failures and resource
    /// failures each get their own code so scripts can branch on them.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidKeyLength | Self::InvalidPrivateKey => 2,
            Self::EncodingError => 3,
            Self::SigningFailure => 4,
            Self::ResourceError => 5,
            Self::InvalidInput
            | Self::HexError
            | Self::JsonError
            | Self::ConfigError
            | Self::Internal => 1,
        }
    }

    /// True for the malformed-private-key class
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::InvalidKeyLength | Self::InvalidPrivateKey)
    }
}

/// Result type alias for signer operations
pub type SignerResult<T> = Result<T, SignerError>;

// Conversions from common error types

impl From<serde_json::Error> for SignerError {
    fn from(e: serde_json::Error) -> Self {
        SignerError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for SignerError {
    fn from(e: hex::FromHexError) -> Self {
        SignerError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for SignerError {
    fn from(e: std::io::Error) -> Self {
        SignerError::new(ErrorCode::Internal, e.to_string())
    }
}
