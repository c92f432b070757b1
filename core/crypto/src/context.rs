//! Crypto contexts: one long-lived encryption identity each.
//!
//! A context derives its write key, salt and IV exactly once, when it is
//! built, and reuses them for every `encrypt` call. Decryption re-derives
//! a key from the read password and the salt carried by the inbound
//! envelope, so values written by another context (an earlier process, or
//! a context with a since-rotated password) can still be read.

use tracing::debug;

use crate::cipher::CipherSpec;
use crate::envelope::Envelope;
use crate::kdf::{derive_key, KeySpec};
use crate::keys::{DerivedKey, Iv, Salt};
use crate::params::ContextParams;
use sealfield_common::{Error, Result, SensitiveBytes};

/// Operations the encryption service needs from a context.
pub trait CryptoContext: Send + Sync {
    /// Encrypt `plaintext` with the context's write key, salt and IV.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt using the read password and the envelope's own salt and IV.
    fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>>;

    /// Salt the write key was derived with.
    fn salt(&self) -> &[u8];

    /// IV used for every encryption.
    fn iv(&self) -> &[u8];
}

/// Context built from explicit parameters.
///
/// Immutable once constructed.
pub struct BaseCryptoContext {
    read_password: SensitiveBytes,
    cipher: CipherSpec,
    key_spec: KeySpec,
    salt: Salt,
    iv: Iv,
    write_key: DerivedKey,
}

impl BaseCryptoContext {
    /// Build a context.
    ///
    /// # Preconditions
    /// - Both passwords are non-empty; they may differ
    /// - `params` names a known cipher, KDF and key algorithm
    ///
    /// # Postconditions
    /// - Salt is random and the write key is derived from it
    /// - IV is captured from an encryption operation initialized with the
    ///   write key
    ///
    /// # Errors
    /// - `Error::Config` for any invalid parameter or a cipher that cannot
    ///   be initialized with the derived key
    pub fn new(read_password: &str, write_password: &str, params: &ContextParams) -> Result<Self> {
        if read_password.is_empty() || write_password.is_empty() {
            return Err(Error::Config("Password cannot be empty".to_string()));
        }
        params.validate()?;

        let cipher = CipherSpec::lookup(&params.cipher)
            .ok_or_else(|| Error::Config(format!("Unknown cipher '{}'", params.cipher)))?;
        let key_spec = KeySpec::resolve(
            &params.key_derivation,
            params.iterations,
            params.key_length_bits,
            &params.key_algorithm,
        )
        .map_err(into_config)?;

        if cipher.family() != key_spec.key_algorithm {
            return Err(Error::Config(format!(
                "{} key cannot initialize cipher {}",
                key_spec.key_algorithm, cipher
            )));
        }

        let salt = Salt::generate();
        let write_key =
            derive_key(write_password.as_bytes(), salt.as_bytes(), &key_spec).map_err(into_config)?;
        let iv = cipher.generate_iv(&write_key).map_err(into_config)?;

        debug!(
            cipher = %cipher,
            kdf = key_spec.algorithm.name(),
            iterations = key_spec.iterations,
            key_bits = key_spec.key_length_bits,
            "Crypto context ready"
        );

        Ok(Self {
            read_password: SensitiveBytes::from(read_password),
            cipher,
            key_spec,
            salt,
            iv,
            write_key,
        })
    }

    /// Resolved cipher.
    pub fn cipher(&self) -> &CipherSpec {
        &self.cipher
    }

    /// Resolved key derivation parameters.
    pub fn key_spec(&self) -> &KeySpec {
        &self.key_spec
    }
}

impl CryptoContext for BaseCryptoContext {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .encrypt(&self.write_key, self.iv.as_bytes(), plaintext)
    }

    fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        let (Some(salt), Some(iv), Some(ciphertext)) =
            (envelope.salt(), envelope.iv(), envelope.ciphertext())
        else {
            return Err(Error::Decrypt(
                "Envelope is missing salt, iv or value".to_string(),
            ));
        };

        let read_key = derive_key(self.read_password.as_bytes(), salt, &self.key_spec)?;
        self.cipher.decrypt(&read_key, iv, ciphertext).map_err(|e| {
            debug!("Decryption failed: {}", e);
            e
        })
    }

    fn salt(&self) -> &[u8] {
        self.salt.as_bytes()
    }

    fn iv(&self) -> &[u8] {
        self.iv.as_bytes()
    }
}

impl std::fmt::Debug for BaseCryptoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseCryptoContext")
            .field("cipher", &self.cipher.to_string())
            .field("key_spec", &self.key_spec)
            .finish_non_exhaustive()
    }
}

fn into_config(err: Error) -> Error {
    match err {
        Error::Config(_) => err,
        other => Error::Config(other.to_string()),
    }
}

/// Password oriented context with a minimum password length.
#[derive(Debug)]
pub struct PasswordCryptoContext {
    inner: BaseCryptoContext,
}

impl PasswordCryptoContext {
    pub const CIPHER_NAME: &'static str = "AES/CBC/PKCS5Padding";
    pub const KEY_NAME: &'static str = "PBKDF2WithHmacSHA512";
    /// Minimum password length in characters.
    pub const MIN_PASSWORD_LENGTH: usize = 8;

    /// Same password for reading and writing, default parameters.
    pub fn new(password: &str) -> Result<Self> {
        Self::with_passwords(password, password)
    }

    /// Separate read and write passwords, default parameters.
    pub fn with_passwords(read_password: &str, write_password: &str) -> Result<Self> {
        Self::with_params(read_password, write_password, &ContextParams::standard())
    }

    /// Separate passwords and explicit parameters.
    pub fn with_params(
        read_password: &str,
        write_password: &str,
        params: &ContextParams,
    ) -> Result<Self> {
        for password in [read_password, write_password] {
            if password.chars().count() < Self::MIN_PASSWORD_LENGTH {
                return Err(Error::Config(format!(
                    "Minimum password length {} characters",
                    Self::MIN_PASSWORD_LENGTH
                )));
            }
        }

        Ok(Self {
            inner: BaseCryptoContext::new(read_password, write_password, params)?,
        })
    }

    /// Underlying context.
    pub fn inner(&self) -> &BaseCryptoContext {
        &self.inner
    }
}

impl CryptoContext for PasswordCryptoContext {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.inner.encrypt(plaintext)
    }

    fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        self.inner.decrypt(envelope)
    }

    fn salt(&self) -> &[u8] {
        self.inner.salt()
    }

    fn iv(&self) -> &[u8] {
        self.inner.iv()
    }
}
