//! Password based encryption for individual values.
//!
//! This module provides:
//! - Key derivation using PBKDF2 with a named HMAC variant
//! - Block cipher transforms with an explicit IV (AES, DES, DESede)
//! - Crypto contexts holding a write key, salt and IV for their lifetime
//! - The `{salt, iv, value}` envelope wire format
//!
//! # Security Notes
//! - A context reuses one IV for every value it encrypts. Equal plaintexts
//!   encrypted by the same context produce equal ciphertexts.
//! - Derived keys and stored passwords are zeroized on drop
//! - No plaintext or key material is ever logged

pub mod cipher;
pub mod context;
pub mod envelope;
pub mod kdf;
pub mod keys;
pub mod params;

pub use cipher::{CipherMode, CipherSpec};
pub use context::{BaseCryptoContext, CryptoContext, PasswordCryptoContext};
pub use envelope::Envelope;
pub use kdf::{derive, derive_key, KdfAlgorithm, KeySpec};
pub use keys::{DerivedKey, Iv, KeyAlgorithm, Salt, SALT_LENGTH};
pub use params::{ContextParams, MIN_ITERATIONS};
