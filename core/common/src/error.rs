//! Common error types for Sealfield.

use thiserror::Error;

use crate::types::Violation;

/// Top-level error type for every encryption operation.
///
/// Callers that only care whether something failed can treat this as one
/// error. Callers that need to react differently use [`Error::kind`].
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing context construction parameters.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Encryption service could not be assembled.
    #[error("Service initialization error: {0}")]
    ServiceInit(String),

    /// Password based key derivation failed.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Cipher initialization or transformation failed while encrypting.
    #[error("Encryption failed: {0}")]
    Encrypt(String),

    /// Cipher initialization or transformation failed while decrypting.
    #[error("Decryption failed: {0}")]
    Decrypt(String),

    /// Unsupported text encoding, or bytes not valid in that encoding.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Structurally invalid encrypted value.
    #[error("Invalid encrypted value: {}", describe(.0))]
    Validation(Vec<Violation>),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised at construction time, never worth retrying.
    Configuration,
    /// Inbound envelope is missing required fields.
    Validation,
    /// Key derivation or cipher failure, including a wrong password.
    Cryptographic,
    /// Serialization or I/O outside the cipher path.
    Data,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::ServiceInit(_) | Error::Encoding(_) => {
                ErrorKind::Configuration
            }
            Error::Validation(_) => ErrorKind::Validation,
            Error::KeyDerivation(_) | Error::Encrypt(_) | Error::Decrypt(_) => {
                ErrorKind::Cryptographic
            }
            Error::Serialization(_) | Error::Io(_) => ErrorKind::Data,
        }
    }

    /// Violations carried by a validation error, empty for any other kind.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Error::Validation(violations) => violations,
            _ => &[],
        }
    }
}

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
