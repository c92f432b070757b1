//! Construction parameters for a crypto context.

use serde::{Deserialize, Serialize};

use sealfield_common::{Error, Result};

/// Lowest iteration count a context will accept.
pub const MIN_ITERATIONS: u32 = 5000;

/// Algorithm names and cost settings for a crypto context.
///
/// All names are resolved against closed registries when the context is
/// built; this struct only carries plain values so it can be loaded from
/// a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextParams {
    /// Cipher transform, e.g. `AES/CBC/PKCS5Padding`.
    pub cipher: String,
    /// PBKDF2 variant, e.g. `PBKDF2WithHmacSHA512`.
    pub key_derivation: String,
    /// PBKDF2 iteration count.
    pub iterations: u32,
    /// Derived key length in bits.
    pub key_length_bits: u32,
    /// Algorithm family the derived key is tagged as, e.g. `AES`.
    pub key_algorithm: String,
}

impl ContextParams {
    /// AES-256-CBC with PBKDF2-HMAC-SHA512 at 65556 iterations.
    pub fn standard() -> Self {
        Self {
            cipher: "AES/CBC/PKCS5Padding".to_string(),
            key_derivation: "PBKDF2WithHmacSHA512".to_string(),
            iterations: 65556,
            key_length_bits: 256,
            key_algorithm: "AES".to_string(),
        }
    }

    /// Same algorithms as [`standard`](Self::standard) with a cheaper
    /// iteration count.
    pub fn fast() -> Self {
        Self {
            iterations: 8000,
            ..Self::standard()
        }
    }

    /// PBKDF2-HMAC-SHA256 variant used by older deployments.
    pub fn legacy() -> Self {
        Self {
            key_derivation: "PBKDF2WithHmacSHA256".to_string(),
            ..Self::standard()
        }
    }

    /// Check that names are present and the iteration count is at least
    /// [`MIN_ITERATIONS`].
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("cipher", &self.cipher),
            ("key_derivation", &self.key_derivation),
            ("key_algorithm", &self.key_algorithm),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} cannot be empty", field)));
            }
        }

        if self.iterations < MIN_ITERATIONS {
            return Err(Error::Config(format!(
                "Iteration count {} is below the minimum of {}",
                self.iterations, MIN_ITERATIONS
            )));
        }

        Ok(())
    }
}

impl Default for ContextParams {
    fn default() -> Self {
        Self::standard()
    }
}
