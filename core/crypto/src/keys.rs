//! Key material and per-context random values.
//!
//! Derived keys zeroize their memory on drop. Salts and IVs are not
//! secret, they travel inside every envelope.

use rand::{rngs::OsRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a freshly generated salt in bytes.
pub const SALT_LENGTH: usize = 20;

/// Symmetric algorithm family a derived key is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Aes,
    Des,
    DesEde,
}

impl KeyAlgorithm {
    /// Resolve a key algorithm by name, ignoring case.
    pub fn lookup(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "AES" => Some(Self::Aes),
            "DES" => Some(Self::Des),
            "DESEDE" | "TRIPLEDES" => Some(Self::DesEde),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes => "AES",
            Self::Des => "DES",
            Self::DesEde => "DESede",
        }
    }

    /// Key lengths in bits this family accepts.
    pub fn key_lengths(&self) -> &'static [u32] {
        match self {
            Self::Aes => &[128, 192, 256],
            Self::Des => &[64],
            Self::DesEde => &[192],
        }
    }

    /// Check whether `bits` is a legal key length for this family.
    pub fn accepts(&self, bits: u32) -> bool {
        self.key_lengths().contains(&bits)
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key produced by password based key derivation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    algorithm: KeyAlgorithm,
}

impl DerivedKey {
    /// Wrap raw key bytes tagged with their algorithm family.
    pub fn from_bytes(key: Vec<u8>, algorithm: KeyAlgorithm) -> Self {
        Self { key, algorithm }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Algorithm family this key is tagged as.
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Key length in bits.
    pub fn len_bits(&self) -> usize {
        self.key.len() * 8
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey({}, [REDACTED])", self.algorithm)
    }
}

/// Salt for key derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Generate a random salt of [`SALT_LENGTH`] bytes.
    pub fn generate() -> Self {
        Self(random_bytes(SALT_LENGTH))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Initialization vector for a block cipher mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iv(Vec<u8>);

impl Iv {
    /// Generate a random IV of `len` bytes.
    pub fn generate(len: usize) -> Self {
        Self(random_bytes(len))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the IV bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}
