//! Envelope encryption service.
//!
//! Wraps a [`CryptoContext`](sealfield_crypto::CryptoContext) and turns
//! payloads into `{salt, iv, value}` envelopes. Inbound envelopes are
//! validated structurally before any decryption is attempted, and every
//! failure surfaces as [`sealfield_common::Error`].

pub mod encoding;
pub mod service;
pub mod validation;

pub use encoding::TextEncoding;
pub use service::{EncryptionService, EncryptionServiceBuilder};
pub use validation::{validate, EnvelopeValidator, StructuralValidator, ValidationResult, NOT_NULL};
