//! Password based key derivation using PBKDF2.
//!
//! The HMAC variant is chosen by name from a closed set. Derivation is
//! deterministic: the same password, salt and [`KeySpec`] always yield
//! the same key bytes.

use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use crate::keys::{DerivedKey, KeyAlgorithm};
use sealfield_common::{Error, Result};

/// Supported PBKDF2 variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KdfAlgorithm {
    Pbkdf2HmacSha1,
    Pbkdf2HmacSha256,
    Pbkdf2HmacSha384,
    Pbkdf2HmacSha512,
}

impl KdfAlgorithm {
    /// Resolve a key derivation algorithm by name, ignoring case.
    pub fn lookup(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "PBKDF2WITHHMACSHA1" => Some(Self::Pbkdf2HmacSha1),
            "PBKDF2WITHHMACSHA256" => Some(Self::Pbkdf2HmacSha256),
            "PBKDF2WITHHMACSHA384" => Some(Self::Pbkdf2HmacSha384),
            "PBKDF2WITHHMACSHA512" => Some(Self::Pbkdf2HmacSha512),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pbkdf2HmacSha1 => "PBKDF2WithHmacSHA1",
            Self::Pbkdf2HmacSha256 => "PBKDF2WithHmacSHA256",
            Self::Pbkdf2HmacSha384 => "PBKDF2WithHmacSHA384",
            Self::Pbkdf2HmacSha512 => "PBKDF2WithHmacSHA512",
        }
    }

    fn fill(&self, password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) {
        match self {
            Self::Pbkdf2HmacSha1 => pbkdf2_hmac::<Sha1>(password, salt, rounds, out),
            Self::Pbkdf2HmacSha256 => pbkdf2_hmac::<Sha256>(password, salt, rounds, out),
            Self::Pbkdf2HmacSha384 => pbkdf2_hmac::<Sha384>(password, salt, rounds, out),
            Self::Pbkdf2HmacSha512 => pbkdf2_hmac::<Sha512>(password, salt, rounds, out),
        }
    }
}

/// Fully resolved key derivation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub algorithm: KdfAlgorithm,
    pub iterations: u32,
    pub key_length_bits: u32,
    pub key_algorithm: KeyAlgorithm,
}

impl KeySpec {
    /// Resolve algorithm names and check the key length.
    ///
    /// # Errors
    /// - Unknown key derivation algorithm or key algorithm type
    /// - Zero iterations
    /// - Key length not legal for the key algorithm type
    pub fn resolve(
        algorithm: &str,
        iterations: u32,
        key_length_bits: u32,
        key_algorithm: &str,
    ) -> Result<Self> {
        let kdf = KdfAlgorithm::lookup(algorithm).ok_or_else(|| {
            Error::KeyDerivation(format!("Unknown key derivation algorithm '{}'", algorithm))
        })?;
        let family = KeyAlgorithm::lookup(key_algorithm).ok_or_else(|| {
            Error::KeyDerivation(format!("Unknown key algorithm '{}'", key_algorithm))
        })?;

        if iterations == 0 {
            return Err(Error::KeyDerivation(
                "Iteration count must be positive".to_string(),
            ));
        }
        if !family.accepts(key_length_bits) {
            return Err(Error::KeyDerivation(format!(
                "Invalid key length {} bits for {}, expected one of {:?}",
                key_length_bits,
                family,
                family.key_lengths()
            )));
        }

        Ok(Self {
            algorithm: kdf,
            iterations,
            key_length_bits,
            key_algorithm: family,
        })
    }
}

/// Derive a key from a password and salt.
///
/// # Errors
/// - Returns error if password or salt is empty
pub fn derive_key(password: &[u8], salt: &[u8], spec: &KeySpec) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(Error::KeyDerivation("Password cannot be empty".to_string()));
    }
    if salt.is_empty() {
        return Err(Error::KeyDerivation("Salt cannot be empty".to_string()));
    }

    let mut key = vec![0u8; (spec.key_length_bits / 8) as usize];
    spec.algorithm.fill(password, salt, spec.iterations, &mut key);

    Ok(DerivedKey::from_bytes(key, spec.key_algorithm))
}

/// Resolve `algorithm` and `key_algorithm` by name, then derive.
pub fn derive(
    password: &[u8],
    salt: &[u8],
    algorithm: &str,
    iterations: u32,
    key_length_bits: u32,
    key_algorithm: &str,
) -> Result<DerivedKey> {
    let spec = KeySpec::resolve(algorithm, iterations, key_length_bits, key_algorithm)?;
    derive_key(password, salt, &spec)
}
